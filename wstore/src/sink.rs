//! Persistence boundary: snapshot handoff contracts and basic sinks.
//!
//! Durability itself is an external collaborator. The engine only promises
//! to hand the current snapshot to a sink after each mutation; what the sink
//! does with it (file, browser storage, network) is not this crate's concern.

use std::sync::Mutex;

use wcommon::BoxFuture;

use crate::snapshot::Snapshot;
use crate::StoreError;

pub trait SnapshotSink: Send + Sync {
    fn persist<'a>(&'a self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<(), StoreError>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSnapshotSink;

impl SnapshotSink for NoopSnapshotSink {
    fn persist<'a>(&'a self, _snapshot: &'a Snapshot) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Keeps the latest snapshot in memory; used by tests and as a reference
/// implementation for real sinks.
#[derive(Debug, Default)]
pub struct InMemorySnapshotSink {
    state: Mutex<SinkState>,
}

#[derive(Debug, Default)]
struct SinkState {
    latest: Option<Snapshot>,
    persist_count: usize,
}

impl InMemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Result<Option<Snapshot>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::persistence("snapshot sink lock poisoned"))?;
        Ok(state.latest.clone())
    }

    pub fn persist_count(&self) -> Result<usize, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::persistence("snapshot sink lock poisoned"))?;
        Ok(state.persist_count)
    }
}

impl SnapshotSink for InMemorySnapshotSink {
    fn persist<'a>(&'a self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self
                .state
                .lock()
                .map_err(|_| StoreError::persistence("snapshot sink lock poisoned"))?;

            state.latest = Some(snapshot.clone());
            state.persist_count += 1;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkshopStore;

    #[tokio::test]
    async fn in_memory_sink_records_latest_snapshot_and_count() {
        let sink = InMemorySnapshotSink::new();
        assert_eq!(sink.persist_count().expect("count should read"), 0);

        let mut store = WorkshopStore::new();
        store.add_expense("فاتورة كهرباء", 300.0);
        let snapshot = store.snapshot(Vec::new());

        sink.persist(&snapshot).await.expect("persist should work");
        sink.persist(&snapshot).await.expect("persist should work");

        assert_eq!(sink.persist_count().expect("count should read"), 2);
        let latest = sink
            .latest()
            .expect("latest should read")
            .expect("a snapshot should be stored");
        assert_eq!(latest.expenses.len(), 1);
    }
}
