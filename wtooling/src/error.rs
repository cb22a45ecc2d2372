//! Tool dispatch errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    UnknownTool,
    InvalidArguments,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub tool_name: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
        }
    }

    pub fn unknown_tool(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::UnknownTool, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    /// True when the model sent something the contract does not allow, as
    /// opposed to the engine failing internally.
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::UnknownTool | ToolErrorKind::InvalidArguments
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.tool_name {
            Some(tool_name) => write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_errors_are_distinguished_from_engine_failures() {
        assert!(ToolError::unknown_tool("no such tool").is_contract_error());
        assert!(ToolError::invalid_arguments("bad args").is_contract_error());
        assert!(!ToolError::execution("lock poisoned").is_contract_error());
    }

    #[test]
    fn tool_name_context_is_included_in_display() {
        let error = ToolError::invalid_arguments("missing 'amount'").with_tool_name("recordPayment");
        let rendered = error.to_string();
        assert!(rendered.contains("recordPayment"));
        assert!(rendered.contains("missing 'amount'"));
    }
}
