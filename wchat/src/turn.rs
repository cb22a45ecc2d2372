//! The turn state machine: one user message in, a settled transcript out.
//!
//! `Idle → StreamingAnswer → (tool detected?) → ExecutingTool →
//! StreamingToolAnswer → Idle`, settling directly from `StreamingAnswer`
//! when no tool call surfaces, and from any state on error after replacing
//! in-progress markers with a fixed apology message. Only one turn may be in
//! flight; submissions while busy are rejected, not queued.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::StreamExt;
use serde_json::json;
use wcommon::SessionId;
use wprovider::{StreamEvent, ToolCall, ToolResultPayload};
use wstore::{ChatRole, NoopSnapshotSink, SnapshotSink};
use wtooling::{DispatchContext, ToolDispatcher};

use crate::{ChatError, ConversationSession, NoopTurnHooks, TurnHooks, TurnPhase, TurnReport};

/// Fixed narrated failure text; raw error detail stays out of the transcript.
pub const APOLOGY_TEXT: &str = "معلش، حصلت مشكلة. حاول تاني.";
pub const LOADING_TEXT: &str = "...";

pub struct TurnOrchestratorBuilder {
    session: ConversationSession,
    dispatcher: ToolDispatcher,
    sink: Arc<dyn SnapshotSink>,
    hooks: Arc<dyn TurnHooks>,
    session_id: SessionId,
}

impl TurnOrchestratorBuilder {
    pub fn new(session: ConversationSession, dispatcher: ToolDispatcher) -> Self {
        Self {
            session,
            dispatcher,
            sink: Arc::new(NoopSnapshotSink),
            hooks: Arc::new(NoopTurnHooks),
            session_id: SessionId::from("workshop"),
        }
    }

    pub fn sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn build(self) -> TurnOrchestrator {
        TurnOrchestrator {
            session: self.session,
            dispatcher: self.dispatcher,
            sink: self.sink,
            hooks: self.hooks,
            session_id: self.session_id,
            phase: Mutex::new(TurnPhase::Idle),
        }
    }
}

pub struct TurnOrchestrator {
    session: ConversationSession,
    dispatcher: ToolDispatcher,
    sink: Arc<dyn SnapshotSink>,
    hooks: Arc<dyn TurnHooks>,
    session_id: SessionId,
    phase: Mutex<TurnPhase>,
}

impl TurnOrchestrator {
    pub fn builder(session: ConversationSession, dispatcher: ToolDispatcher) -> TurnOrchestratorBuilder {
        TurnOrchestratorBuilder::new(session, dispatcher)
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
            .lock()
            .map(|phase| *phase)
            .unwrap_or(TurnPhase::Idle)
    }

    /// Runs one full turn to settlement. On any stream or engine failure the
    /// transcript receives the fixed apology message and the error is
    /// returned for logging; the transcript never shows raw failure detail.
    pub async fn run_turn(&self, text: impl Into<String>) -> Result<TurnReport, ChatError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::invalid_request("user input must not be empty"));
        }

        self.begin_turn()?;
        let started = Instant::now();
        self.hooks.on_turn_start(&self.session_id, &text);

        let result = self.run_turn_inner(text).await;
        match &result {
            Ok(report) => {
                self.hooks
                    .on_turn_complete(&self.session_id, report, started.elapsed());
            }
            Err(error) => {
                // Drop whatever was mid-stream before the apology lands.
                let _ = self.session.with_transcript(|transcript| {
                    transcript.discard_open();
                    transcript.append_assistant(APOLOGY_TEXT);
                });
                let _ = self.persist_snapshot().await;
                self.hooks
                    .on_turn_failure(&self.session_id, error, started.elapsed());
            }
        }

        self.settle();
        result
    }

    async fn run_turn_inner(&self, text: String) -> Result<TurnReport, ChatError> {
        self.session.with_transcript(|transcript| {
            transcript.append_user(&text);
            transcript.open(ChatRole::Loading, LOADING_TEXT);
        })?;

        let mut stream = self.session.send_user_message(text).await?;
        let mut narration = String::new();
        let mut captured = None::<ToolCall>;
        let mut first_fragment = true;

        while let Some(event) = stream.next().await {
            let event = event.map_err(ChatError::from)?;

            if first_fragment {
                first_fragment = false;
                self.session
                    .with_transcript(|transcript| transcript.open(ChatRole::Assistant, ""))?;
            }

            match event {
                StreamEvent::TextDelta(delta) => {
                    narration.push_str(&delta);
                    let prefix = narration.clone();
                    self.session
                        .with_transcript(|transcript| transcript.update_open(prefix))?;
                }
                StreamEvent::ToolCall(call) => {
                    // Single-call-per-turn contract: keep the first, ignore
                    // later signals, and let the text stream finish.
                    if captured.is_none() {
                        self.hooks.on_tool_detected(&self.session_id, &call);
                        captured = Some(call);
                    }
                }
            }
        }
        drop(stream);

        self.session.with_transcript(|transcript| {
            transcript.commit_open();
        })?;

        let Some(call) = captured else {
            self.persist_snapshot().await?;
            return Ok(TurnReport {
                assistant_text: narration,
                tool_invoked: None,
                tool_payload: None,
            });
        };

        self.set_phase(TurnPhase::ExecutingTool)?;
        self.session.with_transcript(|transcript| {
            transcript.open(ChatRole::ToolCall, format!("⚙️ جاري {}...", call.name));
        })?;

        let context = DispatchContext::new(self.session_id.clone());
        let (tool_name, payload, mutated) = match self.dispatcher.dispatch(&call, &context) {
            Ok(outcome) => (outcome.tool_name, outcome.payload, outcome.mutated),
            // Contract violations flow back as a failure payload so the model
            // can narrate them; engine faults abort the turn.
            Err(error) if error.is_contract_error() => (
                call.name.clone(),
                json!({ "success": false, "message": error.to_string() }),
                false,
            ),
            Err(error) => return Err(ChatError::from(error)),
        };

        self.session
            .with_transcript(|transcript| transcript.discard_open())?;

        if mutated {
            self.persist_snapshot().await?;
        }

        self.set_phase(TurnPhase::StreamingToolAnswer)?;
        self.session
            .with_transcript(|transcript| transcript.open(ChatRole::Assistant, ""))?;

        let mut follow_up = self
            .session
            .send_tool_result(ToolResultPayload::new(tool_name.clone(), payload.clone()))
            .await?;

        let mut tool_narration = String::new();
        while let Some(event) = follow_up.next().await {
            match event.map_err(ChatError::from)? {
                StreamEvent::TextDelta(delta) => {
                    tool_narration.push_str(&delta);
                    let prefix = tool_narration.clone();
                    self.session
                        .with_transcript(|transcript| transcript.update_open(prefix))?;
                }
                StreamEvent::ToolCall(_) => {}
            }
        }
        drop(follow_up);

        self.session.with_transcript(|transcript| {
            transcript.commit_open();
        })?;
        self.persist_snapshot().await?;

        Ok(TurnReport {
            assistant_text: tool_narration,
            tool_invoked: Some(tool_name),
            tool_payload: Some(payload),
        })
    }

    fn begin_turn(&self) -> Result<(), ChatError> {
        let mut phase = self
            .phase
            .lock()
            .map_err(|_| ChatError::transcript("turn phase lock poisoned"))?;

        if *phase != TurnPhase::Idle {
            return Err(ChatError::busy("a turn is already in flight"));
        }

        *phase = TurnPhase::StreamingAnswer;
        Ok(())
    }

    fn set_phase(&self, next: TurnPhase) -> Result<(), ChatError> {
        let mut phase = self
            .phase
            .lock()
            .map_err(|_| ChatError::transcript("turn phase lock poisoned"))?;
        *phase = next;
        Ok(())
    }

    fn settle(&self) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = TurnPhase::Idle;
        }
    }

    async fn persist_snapshot(&self) -> Result<(), ChatError> {
        let history = self.session.history()?;
        let snapshot = {
            let store = self.dispatcher.store();
            let store = store
                .lock()
                .map_err(|_| ChatError::store("workshop store lock poisoned"))?;
            store.snapshot(history)
        };

        self.sink.persist(&snapshot).await.map_err(ChatError::from)
    }
}
