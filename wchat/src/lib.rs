//! Conversational orchestration: transcript, session, and the turn state
//! machine driving tool execution against the workshop store.

mod error;
mod hooks;
mod session;
mod transcript;
mod turn;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ConversationSession, NoopTurnHooks, Transcript, TurnHooks,
        TurnOrchestrator, TurnOrchestratorBuilder, TurnPhase, TurnReport, APOLOGY_TEXT,
        LOADING_TEXT,
    };
    pub use wstore::{ChatMessage, ChatRole};
}

pub use error::{ChatError, ChatErrorKind};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use session::ConversationSession;
pub use transcript::Transcript;
pub use turn::{TurnOrchestrator, TurnOrchestratorBuilder, APOLOGY_TEXT, LOADING_TEXT};
pub use types::{TurnPhase, TurnReport};
