use std::sync::{Arc, Mutex};

use serde_json::json;
use wchat::{
    ChatErrorKind, ConversationSession, TurnOrchestrator, TurnPhase, APOLOGY_TEXT,
};
use wprovider::{
    BoxedEventStream, ConnectionFuture, ModelConnection, ProviderError, StreamEvent, ToolCall,
    ToolResultPayload, VecEventStream,
};
use wstore::{ChatRole, InMemorySnapshotSink, OrderDraft, OrderKind, WorkshopStore};
use wtooling::ToolDispatcher;

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    UserText(String),
    ToolResult(String),
}

struct ScriptedConnection {
    sends: Mutex<Vec<Sent>>,
    scripts: Mutex<Vec<Vec<Result<StreamEvent, ProviderError>>>>,
}

impl ScriptedConnection {
    fn new(scripts: Vec<Vec<Result<StreamEvent, ProviderError>>>) -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            scripts: Mutex::new(scripts),
        }
    }

    fn sends(&self) -> Vec<Sent> {
        self.sends.lock().expect("sends lock").clone()
    }

    fn next_script(&self) -> Vec<Result<StreamEvent, ProviderError>> {
        let mut scripts = self.scripts.lock().expect("scripts lock");
        if scripts.is_empty() {
            Vec::new()
        } else {
            scripts.remove(0)
        }
    }
}

impl ModelConnection for ScriptedConnection {
    fn send_user_message<'a>(
        &'a self,
        text: String,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.sends
                .lock()
                .expect("sends lock")
                .push(Sent::UserText(text));
            Ok(Box::pin(VecEventStream::new(self.next_script())) as BoxedEventStream<'a>)
        })
    }

    fn send_tool_result<'a>(
        &'a self,
        result: ToolResultPayload,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.sends
                .lock()
                .expect("sends lock")
                .push(Sent::ToolResult(result.tool_name));
            Ok(Box::pin(VecEventStream::new(self.next_script())) as BoxedEventStream<'a>)
        })
    }
}

struct PendingConnection;

impl ModelConnection for PendingConnection {
    fn send_user_message<'a>(
        &'a self,
        _text: String,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async {
            Ok(Box::pin(futures_util::stream::pending()) as BoxedEventStream<'a>)
        })
    }

    fn send_tool_result<'a>(
        &'a self,
        _result: ToolResultPayload,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async {
            Ok(Box::pin(futures_util::stream::pending()) as BoxedEventStream<'a>)
        })
    }
}

fn orchestrator_with(
    connection: Arc<dyn ModelConnection>,
    sink: Arc<InMemorySnapshotSink>,
    setup: impl FnOnce(&mut WorkshopStore),
) -> TurnOrchestrator {
    let mut store = WorkshopStore::new();
    setup(&mut store);
    let dispatcher = ToolDispatcher::new(Arc::new(Mutex::new(store)));
    let session = ConversationSession::new(connection, Vec::new());

    TurnOrchestrator::builder(session, dispatcher)
        .sink(sink)
        .session_id("workshop-main")
        .build()
}

fn text(delta: &str) -> Result<StreamEvent, ProviderError> {
    Ok(StreamEvent::TextDelta(delta.to_string()))
}

#[tokio::test]
async fn plain_turn_streams_answer_and_settles_idle() {
    let connection = Arc::new(ScriptedConnection::new(vec![vec![
        text("تحت"),
        text(" أمرك يا أسطى"),
    ]]));
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = orchestrator_with(Arc::clone(&connection) as _, Arc::clone(&sink), |_| {});

    let report = orchestrator
        .run_turn("اهلا")
        .await
        .expect("turn should settle");

    assert_eq!(report.assistant_text, "تحت أمرك يا أسطى");
    assert_eq!(report.tool_invoked, None);
    assert_eq!(orchestrator.phase(), TurnPhase::Idle);

    let history = orchestrator.session().history().expect("history should read");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].role, ChatRole::Assistant);
    assert_eq!(history[1].text, "تحت أمرك يا أسطى");

    assert_eq!(connection.sends(), vec![Sent::UserText("اهلا".to_string())]);
    assert_eq!(sink.persist_count().expect("count should read"), 1);
}

#[tokio::test]
async fn tool_turn_dispatches_once_and_consumes_two_streams() {
    let connection = Arc::new(ScriptedConnection::new(vec![
        vec![
            text("ثواني هسجل الدفعة"),
            Ok(StreamEvent::ToolCall(ToolCall::new(
                "recordPayment",
                json!({"orderName": "كنبة", "amount": 500}),
            ))),
        ],
        vec![text("سجلت الدفعة يا أسطى")],
    ]));
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = orchestrator_with(
        Arc::clone(&connection) as _,
        Arc::clone(&sink),
        |store| {
            store.add_order(
                OrderDraft::new("كنبة أستاذ محمد", "أستاذ محمد", OrderKind::New, 3000.0)
                    .with_paid_amount(1000.0),
            );
        },
    );

    let report = orchestrator
        .run_turn("سجل دفعة 500 لكنبة أستاذ محمد")
        .await
        .expect("turn should settle");

    assert_eq!(report.tool_invoked.as_deref(), Some("recordPayment"));
    assert_eq!(report.assistant_text, "سجلت الدفعة يا أسطى");
    let payload = report.tool_payload.expect("payload should be present");
    assert_eq!(payload["success"], true);
    assert_eq!(payload["updatedOrder"]["paidAmount"], 1500.0);

    // Exactly one answer stream and one tool-result stream were consumed.
    let sends = connection.sends();
    assert_eq!(sends.len(), 2);
    assert!(matches!(sends[0], Sent::UserText(_)));
    assert_eq!(sends[1], Sent::ToolResult("recordPayment".to_string()));

    // Exactly one dispatch mutated the store.
    let latest = sink
        .latest()
        .expect("latest should read")
        .expect("a snapshot should be persisted");
    assert_eq!(latest.orders[0].paid_amount, 1500.0);

    // Transcript: user, partial narration, tool narration; no transients.
    let history = orchestrator.session().history().expect("history should read");
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].text, "ثواني هسجل الدفعة");
    assert_eq!(history[2].text, "سجلت الدفعة يا أسطى");
    assert!(history.iter().all(|message| !message.role.is_transient()));

    // Persisted after the mutation and again at settlement.
    assert_eq!(sink.persist_count().expect("count should read"), 2);
    assert_eq!(orchestrator.phase(), TurnPhase::Idle);
}

#[tokio::test]
async fn stream_failure_settles_with_fixed_apology() {
    let connection = Arc::new(ScriptedConnection::new(vec![vec![
        text("جزء من الرد"),
        Err(ProviderError::transport("connection reset")),
    ]]));
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = orchestrator_with(Arc::clone(&connection) as _, Arc::clone(&sink), |_| {});

    let error = orchestrator
        .run_turn("اهلا")
        .await
        .expect_err("turn should surface the failure");
    assert_eq!(error.kind, ChatErrorKind::Provider);

    let history = orchestrator.session().history().expect("history should read");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].text, APOLOGY_TEXT);
    assert!(history.iter().all(|message| !message.role.is_transient()));
    assert_eq!(orchestrator.phase(), TurnPhase::Idle);
}

#[tokio::test]
async fn unknown_tool_is_narrated_not_fatal() {
    let connection = Arc::new(ScriptedConnection::new(vec![
        vec![Ok(StreamEvent::ToolCall(ToolCall::new(
            "transferFunds",
            json!({}),
        )))],
        vec![text("معلش، مش قادر أعمل دي")],
    ]));
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = orchestrator_with(Arc::clone(&connection) as _, Arc::clone(&sink), |_| {});

    let report = orchestrator
        .run_turn("حول فلوس")
        .await
        .expect("turn should still settle");

    assert_eq!(report.tool_invoked.as_deref(), Some("transferFunds"));
    let payload = report.tool_payload.expect("payload should be present");
    assert_eq!(payload["success"], false);
    assert_eq!(connection.sends().len(), 2);
}

#[tokio::test]
async fn submissions_while_busy_are_rejected_not_queued() {
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = Arc::new(orchestrator_with(
        Arc::new(PendingConnection) as _,
        Arc::clone(&sink),
        |_| {},
    ));

    let background = Arc::clone(&orchestrator);
    let in_flight = tokio::spawn(async move { background.run_turn("مستمر").await });

    for _ in 0..50 {
        if orchestrator.phase() != TurnPhase::Idle {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_ne!(orchestrator.phase(), TurnPhase::Idle);

    let rejected = orchestrator
        .run_turn("رسالة جديدة")
        .await
        .expect_err("second submission should be rejected");
    assert_eq!(rejected.kind, ChatErrorKind::Busy);

    in_flight.abort();
}

#[tokio::test]
async fn empty_input_never_reaches_the_connection() {
    let connection = Arc::new(ScriptedConnection::new(Vec::new()));
    let sink = Arc::new(InMemorySnapshotSink::new());
    let orchestrator = orchestrator_with(Arc::clone(&connection) as _, Arc::clone(&sink), |_| {});

    let error = orchestrator
        .run_turn("   ")
        .await
        .expect_err("blank input should be rejected");
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert!(connection.sends().is_empty());
    assert!(orchestrator
        .session()
        .history()
        .expect("history should read")
        .is_empty());
}
