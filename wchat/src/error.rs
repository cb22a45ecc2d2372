//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Busy,
    Provider,
    Tooling,
    Store,
    Transcript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Busy, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn transcript(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transcript, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<wprovider::ProviderError> for ChatError {
    fn from(value: wprovider::ProviderError) -> Self {
        ChatError::provider(value.to_string())
    }
}

impl From<wtooling::ToolError> for ChatError {
    fn from(value: wtooling::ToolError) -> Self {
        ChatError::tooling(value.to_string())
    }
}

impl From<wstore::StoreError> for ChatError {
    fn from(value: wstore::StoreError) -> Self {
        ChatError::store(value.to_string())
    }
}
