use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use serde_json::json;
use wprovider::adapters::gemini::{
    GeminiAuth, GeminiChunkStream, GeminiConnection, GeminiFunctionCall, GeminiRequest,
    GeminiStreamChunk, GenerativeTransport,
};
use wprovider::{
    ConnectionConfig, ConnectionFuture, ModelConnection, ModelMessage, ProviderError, Role,
    StreamEvent, ToolResultPayload,
};

#[derive(Debug)]
struct ScriptedTransport {
    requests: Mutex<Vec<GeminiRequest>>,
    scripts: Mutex<Vec<Vec<Result<GeminiStreamChunk, ProviderError>>>>,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Vec<Result<GeminiStreamChunk, ProviderError>>>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            scripts: Mutex::new(scripts),
        }
    }

    fn requests(&self) -> Vec<GeminiRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl GenerativeTransport for ScriptedTransport {
    fn stream_generate<'a>(
        &'a self,
        request: GeminiRequest,
        _auth: GeminiAuth,
    ) -> ConnectionFuture<'a, Result<GeminiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);

            let mut scripts = self.scripts.lock().expect("scripts lock");
            let script = if scripts.is_empty() {
                Vec::new()
            } else {
                scripts.remove(0)
            };

            Ok(Box::pin(futures_util::stream::iter(script)) as GeminiChunkStream<'a>)
        })
    }
}

fn connection(
    transport: Arc<ScriptedTransport>,
    history: Vec<ModelMessage>,
) -> GeminiConnection {
    let config = ConnectionConfig::builder("gemini-2.5-flash")
        .system_instruction("أنت مساعد الورشة الذكي")
        .history(history)
        .build()
        .expect("config should build");

    GeminiConnection::new(transport, GeminiAuth::ApiKey("test-key".to_string()), config)
}

#[tokio::test]
async fn user_message_streams_text_and_records_both_sides() {
    let transport = Arc::new(ScriptedTransport::new(vec![vec![
        Ok(GeminiStreamChunk::TextDelta("تمام يا".to_string())),
        Ok(GeminiStreamChunk::TextDelta(" معلم".to_string())),
    ]]));
    let connection = connection(Arc::clone(&transport), Vec::new());

    let mut stream = connection
        .send_user_message("اهلا".to_string())
        .await
        .expect("stream should start");

    let mut deltas = Vec::new();
    while let Some(event) = stream.next().await {
        match event.expect("event should be ok") {
            StreamEvent::TextDelta(delta) => deltas.push(delta),
            StreamEvent::ToolCall(call) => panic!("unexpected tool call: {}", call.name),
        }
    }
    assert_eq!(deltas, vec!["تمام يا", " معلم"]);

    let history = connection.history().expect("history should read");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, "user");
    assert_eq!(history[1].role, "model");
    assert_eq!(history[1].parts[0].text.as_deref(), Some("تمام يا معلم"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system_instruction, "أنت مساعد الورشة الذكي");
    assert_eq!(requests[0].contents.len(), 1);
}

#[tokio::test]
async fn prior_history_is_replayed_into_the_first_request() {
    let transport = Arc::new(ScriptedTransport::new(vec![vec![Ok(
        GeminiStreamChunk::TextDelta("تحت أمرك".to_string()),
    )]]));
    let connection = connection(
        Arc::clone(&transport),
        vec![
            ModelMessage::new(Role::User, "سؤال قديم"),
            ModelMessage::new(Role::Model, "رد قديم"),
        ],
    );

    let mut stream = connection
        .send_user_message("سؤال جديد".to_string())
        .await
        .expect("stream should start");
    while let Some(event) = stream.next().await {
        event.expect("event should be ok");
    }

    let requests = transport.requests();
    let contents = &requests[0].contents;
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0].parts[0].text.as_deref(), Some("سؤال قديم"));
    assert_eq!(contents[1].role, "model");
    assert_eq!(contents[2].parts[0].text.as_deref(), Some("سؤال جديد"));
}

#[tokio::test]
async fn tool_call_round_trip_feeds_function_response_back() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        vec![
            Ok(GeminiStreamChunk::TextDelta("ثواني هسجلها".to_string())),
            Ok(GeminiStreamChunk::FunctionCall(GeminiFunctionCall {
                name: "recordPayment".to_string(),
                args: json!({"orderName": "كنبة", "amount": 500}),
            })),
        ],
        vec![Ok(GeminiStreamChunk::TextDelta(
            "سجلت الدفعة يا أسطى".to_string(),
        ))],
    ]));
    let connection = connection(Arc::clone(&transport), Vec::new());

    let mut stream = connection
        .send_user_message("سجل دفعة".to_string())
        .await
        .expect("stream should start");

    let mut tool_call = None;
    while let Some(event) = stream.next().await {
        if let StreamEvent::ToolCall(call) = event.expect("event should be ok") {
            tool_call = Some(call);
        }
    }
    let tool_call = tool_call.expect("a tool call should surface");
    assert_eq!(tool_call.name, "recordPayment");
    assert_eq!(tool_call.args["amount"], 500);

    let mut follow_up = connection
        .send_tool_result(ToolResultPayload::new(
            "recordPayment",
            json!({"success": true}),
        ))
        .await
        .expect("follow-up stream should start");
    while let Some(event) = follow_up.next().await {
        event.expect("event should be ok");
    }

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);

    // Second request replays: user text, model narration + call, tool response.
    let contents = &requests[1].contents;
    assert_eq!(contents.len(), 3);
    let model_parts = &contents[1].parts;
    assert!(model_parts.iter().any(|part| part.function_call.is_some()));
    let response_part = contents[2].parts[0]
        .function_response
        .as_ref()
        .expect("tool response part should be present");
    assert_eq!(response_part.name, "recordPayment");

    let history = connection.history().expect("history should read");
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn transport_errors_surface_through_the_stream() {
    let transport = Arc::new(ScriptedTransport::new(vec![vec![
        Ok(GeminiStreamChunk::TextDelta("جزء".to_string())),
        Err(ProviderError::transport("connection reset")),
    ]]));
    let connection = connection(Arc::clone(&transport), Vec::new());

    let mut stream = connection
        .send_user_message("اهلا".to_string())
        .await
        .expect("stream should start");

    let first = stream.next().await.expect("first item should exist");
    assert!(first.is_ok());

    let second = stream.next().await.expect("second item should exist");
    let error = second.expect_err("stream should surface the transport error");
    assert_eq!(error.kind, wprovider::ProviderErrorKind::Transport);

    // The failed exchange records no model-side content.
    let history = connection.history().expect("history should read");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, "user");
}
