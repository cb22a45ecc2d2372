use std::time::Duration;

use serde_json::json;
use wchat::{ChatError, TurnHooks, TurnReport};
use wcommon::SessionId;
use wprovider::ToolCall;
use wtooling::{DispatchContext, DispatchHooks, DispatchOutcome, ToolError};

use crate::{MetricsAssistantHooks, TracingAssistantHooks};

fn sample_call() -> ToolCall {
    ToolCall::new("recordPayment", json!({"orderName": "كنبة", "amount": 500}))
}

fn sample_context() -> DispatchContext {
    DispatchContext::new("workshop-main").with_trace_id("turn-3")
}

fn sample_report() -> TurnReport {
    TurnReport {
        assistant_text: "سجلت الدفعة يا أسطى".to_string(),
        tool_invoked: Some("recordPayment".to_string()),
        tool_payload: Some(json!({"success": true})),
    }
}

fn sample_outcome() -> DispatchOutcome {
    DispatchOutcome {
        tool_name: "recordPayment".to_string(),
        payload: json!({"success": true}),
        mutated: true,
    }
}

#[test]
fn tracing_hooks_cover_every_turn_event() {
    let hooks = TracingAssistantHooks;
    let session_id = SessionId::from("workshop-main");

    hooks.on_turn_start(&session_id, "سجل دفعة");
    hooks.on_tool_detected(&session_id, &sample_call());
    hooks.on_turn_complete(&session_id, &sample_report(), Duration::from_millis(120));
    hooks.on_turn_failure(
        &session_id,
        &ChatError::provider("Transport: connection reset"),
        Duration::from_millis(40),
    );
}

#[test]
fn tracing_hooks_cover_every_dispatch_event() {
    let hooks = TracingAssistantHooks;

    hooks.on_dispatch_start(&sample_call(), &sample_context());
    hooks.on_dispatch_success(
        &sample_call(),
        &sample_context(),
        &sample_outcome(),
        Duration::from_millis(2),
    );
    hooks.on_dispatch_failure(
        &sample_call(),
        &sample_context(),
        &ToolError::invalid_arguments("missing 'amount'"),
        Duration::from_millis(1),
    );
}

#[test]
fn metrics_hooks_cover_every_event_without_a_recorder() {
    // Without an installed recorder these are no-ops; the point is that the
    // full surface stays callable.
    let hooks = MetricsAssistantHooks;
    let session_id = SessionId::from("workshop-main");

    hooks.on_turn_start(&session_id, "سجل دفعة");
    hooks.on_tool_detected(&session_id, &sample_call());
    hooks.on_turn_complete(&session_id, &sample_report(), Duration::from_millis(120));
    hooks.on_turn_failure(
        &session_id,
        &ChatError::busy("a turn is already in flight"),
        Duration::from_millis(5),
    );
    hooks.on_dispatch_start(&sample_call(), &sample_context());
    hooks.on_dispatch_success(
        &sample_call(),
        &sample_context(),
        &sample_outcome(),
        Duration::from_millis(2),
    );
    hooks.on_dispatch_failure(
        &sample_call(),
        &sample_context(),
        &ToolError::unknown_tool("'transferFunds' is not part of the tool contract"),
        Duration::from_millis(1),
    );
}
