//! Stable, facade-owned wiring for the full assistant engine.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use wchat::{
    ChatError, ConversationSession, Transcript, TurnHooks, TurnOrchestrator, TurnPhase, TurnReport,
};
use wcommon::SessionId;
use wprovider::ModelConnector;
use wstore::{ChatMessage, NoopSnapshotSink, Snapshot, SnapshotSink, WorkshopStore};
use wtooling::{DispatchHooks, NoopDispatchHooks, ToolDispatcher};

pub struct WorkshopAssistantBuilder {
    connector: Arc<dyn ModelConnector>,
    snapshot: Snapshot,
    sink: Arc<dyn SnapshotSink>,
    dispatch_hooks: Arc<dyn DispatchHooks>,
    turn_hooks: Arc<dyn TurnHooks>,
    session_id: SessionId,
}

impl WorkshopAssistantBuilder {
    pub fn new(connector: Arc<dyn ModelConnector>) -> Self {
        Self {
            connector,
            snapshot: Snapshot::default(),
            sink: Arc::new(NoopSnapshotSink),
            dispatch_hooks: Arc::new(NoopDispatchHooks),
            turn_hooks: Arc::new(wchat::NoopTurnHooks),
            session_id: SessionId::from("workshop"),
        }
    }

    pub fn snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Bootstraps from raw persisted JSON, applying the repair-on-load
    /// policy before anything else sees the data.
    pub fn raw_snapshot(mut self, raw: &Value) -> Self {
        self.snapshot = Snapshot::repair(raw);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn dispatch_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.dispatch_hooks = hooks;
        self
    }

    pub fn turn_hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.turn_hooks = hooks;
        self
    }

    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn build(self) -> Result<WorkshopAssistant, ChatError> {
        WorkshopAssistant::assemble(
            self.connector,
            self.snapshot,
            self.sink,
            self.dispatch_hooks,
            self.turn_hooks,
            self.session_id,
        )
    }
}

/// The assembled engine: store, dispatcher, session, and orchestrator behind
/// one handle. Direct (non-conversational) mutations go through [`store`];
/// conversational ones go through [`send`].
///
/// [`store`]: WorkshopAssistant::store
/// [`send`]: WorkshopAssistant::send
pub struct WorkshopAssistant {
    connector: Arc<dyn ModelConnector>,
    sink: Arc<dyn SnapshotSink>,
    dispatch_hooks: Arc<dyn DispatchHooks>,
    turn_hooks: Arc<dyn TurnHooks>,
    session_id: SessionId,
    store: Arc<Mutex<WorkshopStore>>,
    orchestrator: TurnOrchestrator,
}

impl WorkshopAssistant {
    pub fn builder(connector: Arc<dyn ModelConnector>) -> WorkshopAssistantBuilder {
        WorkshopAssistantBuilder::new(connector)
    }

    fn assemble(
        connector: Arc<dyn ModelConnector>,
        snapshot: Snapshot,
        sink: Arc<dyn SnapshotSink>,
        dispatch_hooks: Arc<dyn DispatchHooks>,
        turn_hooks: Arc<dyn TurnHooks>,
        session_id: SessionId,
    ) -> Result<Self, ChatError> {
        let store = Arc::new(Mutex::new(WorkshopStore::from_snapshot(&snapshot)));

        let transcript = Transcript::from_history(snapshot.chat_history.clone());
        let connection = connector
            .connect(transcript.model_history())
            .map_err(ChatError::from)?;
        let session = ConversationSession::new(connection, snapshot.chat_history);

        let dispatcher =
            ToolDispatcher::new(Arc::clone(&store)).with_hooks(Arc::clone(&dispatch_hooks));

        let orchestrator = TurnOrchestrator::builder(session, dispatcher)
            .sink(Arc::clone(&sink))
            .hooks(Arc::clone(&turn_hooks))
            .session_id(session_id.clone())
            .build();

        Ok(Self {
            connector,
            sink,
            dispatch_hooks,
            turn_hooks,
            session_id,
            store,
            orchestrator,
        })
    }

    /// Runs one conversational turn to settlement.
    pub async fn send(&self, text: impl Into<String>) -> Result<TurnReport, ChatError> {
        self.orchestrator.run_turn(text).await
    }

    pub fn phase(&self) -> TurnPhase {
        self.orchestrator.phase()
    }

    /// Display transcript, including any in-progress message.
    pub fn messages(&self) -> Result<Vec<ChatMessage>, ChatError> {
        self.orchestrator.session().messages()
    }

    /// Shared handle for the direct mutation path (forms, maintenance
    /// jobs). Both paths converge on the same store operations.
    pub fn store(&self) -> Arc<Mutex<WorkshopStore>> {
        Arc::clone(&self.store)
    }

    pub fn snapshot(&self) -> Result<Snapshot, ChatError> {
        let history = self.orchestrator.session().history()?;
        let store = self
            .store
            .lock()
            .map_err(|_| ChatError::store("workshop store lock poisoned"))?;
        Ok(store.snapshot(history))
    }

    /// Hands the current snapshot to the sink; used after direct mutations,
    /// which bypass the orchestrator's own persistence handoff.
    pub async fn persist(&self) -> Result<(), ChatError> {
        let snapshot = self.snapshot()?;
        self.sink.persist(&snapshot).await.map_err(ChatError::from)
    }

    /// Replaces all data from raw persisted JSON. The store is swapped and
    /// the conversation session is reconstructed wholesale over the imported
    /// transcript, never incrementally patched.
    pub fn import_raw(&mut self, raw: &Value) -> Result<Snapshot, ChatError> {
        let snapshot = Snapshot::repair(raw);

        *self = Self::assemble(
            Arc::clone(&self.connector),
            snapshot.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&self.dispatch_hooks),
            Arc::clone(&self.turn_hooks),
            self.session_id.clone(),
        )?;

        Ok(snapshot)
    }
}
