//! The conversation session: transcript ownership plus the live connection.

use std::sync::{Arc, Mutex};

use wprovider::{BoxedEventStream, ModelConnection, ToolResultPayload};
use wstore::ChatMessage;

use crate::{ChatError, Transcript};

/// Owns the ordered transcript and the dialogue handle. Sessions are built
/// from an existing transcript so conversations survive reloads, and are
/// reconstructed wholesale (connection included) whenever history is
/// replaced, e.g. after a full-data import.
pub struct ConversationSession {
    connection: Arc<dyn ModelConnection>,
    transcript: Mutex<Transcript>,
}

impl ConversationSession {
    pub fn new(connection: Arc<dyn ModelConnection>, history: Vec<ChatMessage>) -> Self {
        Self {
            connection,
            transcript: Mutex::new(Transcript::from_history(history)),
        }
    }

    pub(crate) fn with_transcript<T>(
        &self,
        operate: impl FnOnce(&mut Transcript) -> T,
    ) -> Result<T, ChatError> {
        let mut transcript = self
            .transcript
            .lock()
            .map_err(|_| ChatError::transcript("transcript lock poisoned"))?;
        Ok(operate(&mut transcript))
    }

    /// Display view, including any in-progress message.
    pub fn messages(&self) -> Result<Vec<ChatMessage>, ChatError> {
        self.with_transcript(|transcript| transcript.messages())
    }

    /// Persisted view: committed, non-transient history only.
    pub fn history(&self) -> Result<Vec<ChatMessage>, ChatError> {
        self.with_transcript(|transcript| transcript.history())
    }

    pub async fn send_user_message(
        &self,
        text: String,
    ) -> Result<BoxedEventStream<'_>, ChatError> {
        self.connection
            .send_user_message(text)
            .await
            .map_err(ChatError::from)
    }

    pub async fn send_tool_result(
        &self,
        result: ToolResultPayload,
    ) -> Result<BoxedEventStream<'_>, ChatError> {
        self.connection
            .send_tool_result(result)
            .await
            .map_err(ChatError::from)
    }
}
