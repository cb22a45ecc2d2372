//! Tracing-based observability hooks for turn and dispatch phases.
//!
//! ```rust
//! use wchat::TurnHooks;
//! use wobserve::TracingAssistantHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = TracingAssistantHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use wchat::{ChatError, TurnHooks, TurnReport};
use wcommon::SessionId;
use wprovider::ToolCall;
use wtooling::{DispatchContext, DispatchHooks, DispatchOutcome, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAssistantHooks;

impl TurnHooks for TracingAssistantHooks {
    fn on_turn_start(&self, session_id: &SessionId, user_text: &str) {
        tracing::info!(
            phase = "turn",
            event = "start",
            session_id = %session_id,
            user_chars = user_text.chars().count()
        );
    }

    fn on_tool_detected(&self, session_id: &SessionId, call: &ToolCall) {
        tracing::info!(
            phase = "turn",
            event = "tool_detected",
            session_id = %session_id,
            tool_name = call.name
        );
    }

    fn on_turn_complete(&self, session_id: &SessionId, report: &TurnReport, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "complete",
            session_id = %session_id,
            tool_invoked = report.tool_invoked.as_deref(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            session_id = %session_id,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}

impl DispatchHooks for TracingAssistantHooks {
    fn on_dispatch_start(&self, call: &ToolCall, context: &DispatchContext) {
        tracing::info!(
            phase = "dispatch",
            event = "start",
            tool_name = call.name,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_dispatch_success(
        &self,
        call: &ToolCall,
        context: &DispatchContext,
        outcome: &DispatchOutcome,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "dispatch",
            event = "success",
            tool_name = call.name,
            session_id = %context.session_id,
            mutated = outcome.mutated,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_dispatch_failure(
        &self,
        call: &ToolCall,
        context: &DispatchContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "dispatch",
            event = "failure",
            tool_name = call.name,
            session_id = %context.session_id,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
