//! Unified facade over the warsha workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the member crates and wires the store, tool dispatcher,
//! conversation session, and turn orchestrator into one assistant handle.

mod assistant;

pub mod prelude;

pub use wchat;
pub use wcommon;
pub use wprovider;
pub use wstore;
pub use wtooling;

pub use assistant::{WorkshopAssistant, WorkshopAssistantBuilder};

pub use wchat::{
    ChatError, ChatErrorKind, ConversationSession, NoopTurnHooks, Transcript, TurnHooks,
    TurnOrchestrator, TurnOrchestratorBuilder, TurnPhase, TurnReport, APOLOGY_TEXT, LOADING_TEXT,
};
pub use wcommon::{BoxFuture, MetadataMap, SessionId, TraceId};
pub use wprovider::{
    BoxedEventStream, ConnectionConfig, ConnectionConfigBuilder, ConnectionFuture,
    ModelConnection, ModelConnector, ModelEventStream, ModelMessage, ProviderError,
    ProviderErrorKind, Role, StreamEvent, ToolCall, ToolDeclaration, ToolResultPayload,
    VecEventStream,
};
pub use wprovider::adapters::gemini::{GeminiConnection, GeminiConnector};
pub use wstore::{
    CalculationItem, CalculationList, ChatMessage, ChatRole, DashboardSummary, Expense,
    InMemorySnapshotSink, InventoryItem, MonthKey, MonthlyTotals, NoopSnapshotSink, NotepadEntry,
    Order, OrderDraft, OrderKind, OrderPatch, OrderSort, OrderStatus, PricedMaterial, Snapshot,
    SnapshotSink, StoreError, StoreErrorKind, WorkshopStore,
};
pub use wtooling::{
    DispatchContext, DispatchHooks, DispatchOutcome, Intent, MaterialQuantity,
    NoopDispatchHooks, RegisterOrder, ToolDispatcher, ToolError, ToolErrorKind,
};
