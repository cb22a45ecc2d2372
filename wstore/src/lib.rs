//! Workshop business data: records, the store, derivations, resolution,
//! and the snapshot persistence boundary.

mod derive;
mod error;
mod records;
mod resolver;
mod sink;
mod snapshot;
mod store;

pub use derive::{DashboardSummary, MonthKey, MonthlyTotals, OrderSort};
pub use error::{StoreError, StoreErrorKind};
pub use records::{
    CalculationItem, CalculationList, ChatMessage, ChatRole, Expense, InventoryItem, NotepadEntry,
    Order, OrderDraft, OrderKind, OrderPatch, OrderStatus, PricedMaterial,
};
pub use resolver::{resolve_reference, NamedRecord};
pub use sink::{InMemorySnapshotSink, NoopSnapshotSink, SnapshotSink};
pub use snapshot::{Snapshot, FALLBACK_CLIENT_NAME, FALLBACK_UNIT};
pub use store::WorkshopStore;
