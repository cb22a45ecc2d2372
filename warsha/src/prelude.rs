//! Convenience imports for typical assistant setups.
//!
//! ```rust
//! use warsha::prelude::*;
//!
//! let snapshot = Snapshot::default();
//! assert!(snapshot.orders.is_empty());
//! ```

pub use crate::{
    ChatError, ChatErrorKind, ChatMessage, ChatRole, GeminiConnector, ModelConnector, MonthKey,
    Order, OrderDraft, OrderKind, OrderStatus, Snapshot, SnapshotSink, ToolCall, ToolDeclaration,
    ToolDispatcher, TurnPhase, TurnReport, WorkshopAssistant, WorkshopAssistantBuilder,
    WorkshopStore,
};
