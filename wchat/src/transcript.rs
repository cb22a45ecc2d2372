//! The conversation transcript: an append-only committed log plus one
//! explicit open slot for the in-progress message.
//!
//! Streaming updates never mutate committed history; they replace the open
//! slot's text with the cumulative prefix so far. Transient roles (loading,
//! tool-call) only ever live in the open slot and are discarded, not
//! committed, so persisted history stays clean.

use chrono::Utc;
use wprovider::{ModelMessage, Role};
use wstore::{ChatMessage, ChatRole};

#[derive(Debug, Default)]
pub struct Transcript {
    committed: Vec<ChatMessage>,
    open: Option<ChatMessage>,
    seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from persisted history. Transient markers left behind by an
    /// interrupted turn are dropped.
    pub fn from_history(history: Vec<ChatMessage>) -> Self {
        Self {
            committed: history
                .into_iter()
                .filter(|message| !message.role.is_transient())
                .collect(),
            open: None,
            seq: 0,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), self.seq)
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(self.next_id("user"), ChatRole::User, text);
        self.committed.push(message.clone());
        message
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(self.next_id("asst"), ChatRole::Assistant, text);
        self.committed.push(message.clone());
        message
    }

    /// Fills the open slot, replacing whatever held it before.
    pub fn open(&mut self, role: ChatRole, text: impl Into<String>) {
        let prefix = match role {
            ChatRole::User => "user",
            ChatRole::Assistant => "asst",
            ChatRole::Loading => "loading",
            ChatRole::ToolCall => "tool",
        };
        let id = self.next_id(prefix);
        self.open = Some(ChatMessage::new(id, role, text));
    }

    /// Replaces the open message's text with the latest cumulative prefix.
    pub fn update_open(&mut self, text: impl Into<String>) {
        if let Some(open) = self.open.as_mut() {
            open.text = text.into();
        }
    }

    pub fn open_role(&self) -> Option<ChatRole> {
        self.open.as_ref().map(|message| message.role)
    }

    /// Moves the open message into committed history. Transient roles are
    /// dropped instead; they never become permanent history.
    pub fn commit_open(&mut self) -> Option<ChatMessage> {
        let message = self.open.take()?;
        if message.role.is_transient() {
            return None;
        }

        self.committed.push(message.clone());
        Some(message)
    }

    pub fn discard_open(&mut self) {
        self.open = None;
    }

    /// Display view: committed history plus the in-progress message.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut view = self.committed.clone();
        if let Some(open) = &self.open {
            view.push(open.clone());
        }
        view
    }

    /// Persisted view: committed history only.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.committed.clone()
    }

    /// The transcript as the model connection consumes it.
    pub fn model_history(&self) -> Vec<ModelMessage> {
        self.committed
            .iter()
            .filter_map(|message| match message.role {
                ChatRole::User => Some(ModelMessage::new(Role::User, message.text.clone())),
                ChatRole::Assistant => Some(ModelMessage::new(Role::Model, message.text.clone())),
                ChatRole::Loading | ChatRole::ToolCall => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_slot_updates_replace_the_cumulative_prefix() {
        let mut transcript = Transcript::new();
        transcript.append_user("اهلا");
        transcript.open(ChatRole::Assistant, "");
        transcript.update_open("تمام");
        transcript.update_open("تمام يا معلم");

        let view = transcript.messages();
        assert_eq!(view.len(), 2);
        assert_eq!(view[1].text, "تمام يا معلم");

        transcript.commit_open().expect("assistant message should commit");
        assert_eq!(transcript.history().len(), 2);
    }

    #[test]
    fn transient_roles_never_commit() {
        let mut transcript = Transcript::new();
        transcript.open(ChatRole::Loading, "...");
        assert!(transcript.commit_open().is_none());
        assert!(transcript.history().is_empty());

        transcript.open(ChatRole::ToolCall, "⚙️ جاري recordPayment...");
        assert_eq!(transcript.open_role(), Some(ChatRole::ToolCall));
        transcript.discard_open();
        assert!(transcript.messages().is_empty());
    }

    #[test]
    fn opening_replaces_a_leftover_transient() {
        let mut transcript = Transcript::new();
        transcript.open(ChatRole::Loading, "...");
        transcript.open(ChatRole::Assistant, "");
        transcript.update_open("وصلني");

        let view = transcript.messages();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].role, ChatRole::Assistant);
    }

    #[test]
    fn history_rebuild_drops_stale_transients() {
        let history = vec![
            ChatMessage::new("m1", ChatRole::User, "سجل طلب"),
            ChatMessage::new("m2", ChatRole::Loading, "..."),
            ChatMessage::new("m3", ChatRole::Assistant, "تم"),
            ChatMessage::new("m4", ChatRole::ToolCall, "⚙️"),
        ];

        let transcript = Transcript::from_history(history);
        assert_eq!(transcript.history().len(), 2);

        let model_history = transcript.model_history();
        assert_eq!(model_history.len(), 2);
        assert_eq!(model_history[0].role, Role::User);
        assert_eq!(model_history[1].role, Role::Model);
    }

    #[test]
    fn message_ids_are_unique_within_a_transcript() {
        let mut transcript = Transcript::new();
        let first = transcript.append_user("أول");
        let second = transcript.append_user("ثاني");
        assert_ne!(first.id, second.id);
    }
}
