//! Metrics-based observability hooks for turn and dispatch phases.
//!
//! ```rust
//! use wobserve::MetricsAssistantHooks;
//! use wtooling::DispatchHooks;
//!
//! fn accepts_dispatch_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = MetricsAssistantHooks;
//! accepts_dispatch_hooks(&hooks);
//! ```

use std::time::Duration;

use wchat::{ChatError, TurnHooks, TurnReport};
use wcommon::SessionId;
use wprovider::ToolCall;
use wtooling::{DispatchContext, DispatchHooks, DispatchOutcome, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAssistantHooks;

impl TurnHooks for MetricsAssistantHooks {
    fn on_turn_start(&self, _session_id: &SessionId, _user_text: &str) {
        metrics::counter!("warsha_turn_start_total").increment(1);
    }

    fn on_tool_detected(&self, _session_id: &SessionId, call: &ToolCall) {
        metrics::counter!(
            "warsha_turn_tool_detected_total",
            "tool_name" => call.name.clone()
        )
        .increment(1);
    }

    fn on_turn_complete(&self, _session_id: &SessionId, report: &TurnReport, elapsed: Duration) {
        metrics::counter!(
            "warsha_turn_complete_total",
            "with_tool" => if report.tool_invoked.is_some() { "true" } else { "false" }
        )
        .increment(1);
        metrics::histogram!("warsha_turn_duration_seconds", "status" => "complete")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _session_id: &SessionId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "warsha_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("warsha_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}

impl DispatchHooks for MetricsAssistantHooks {
    fn on_dispatch_start(&self, call: &ToolCall, _context: &DispatchContext) {
        metrics::counter!(
            "warsha_dispatch_start_total",
            "tool_name" => call.name.clone()
        )
        .increment(1);
    }

    fn on_dispatch_success(
        &self,
        call: &ToolCall,
        _context: &DispatchContext,
        outcome: &DispatchOutcome,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "warsha_dispatch_success_total",
            "tool_name" => call.name.clone(),
            "mutated" => if outcome.mutated { "true" } else { "false" }
        )
        .increment(1);
        metrics::histogram!(
            "warsha_dispatch_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_dispatch_failure(
        &self,
        call: &ToolCall,
        _context: &DispatchContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "warsha_dispatch_failure_total",
            "tool_name" => call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "warsha_dispatch_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
