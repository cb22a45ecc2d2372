//! Turn observation hooks.
//!
//! ```rust
//! use wchat::{NoopTurnHooks, TurnHooks};
//!
//! fn accepts_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = NoopTurnHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use wcommon::SessionId;
use wprovider::ToolCall;

use crate::{ChatError, TurnReport};

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _user_text: &str) {}

    fn on_tool_detected(&self, _session_id: &SessionId, _call: &ToolCall) {}

    fn on_turn_complete(&self, _session_id: &SessionId, _report: &TurnReport, _elapsed: Duration) {}

    fn on_turn_failure(&self, _session_id: &SessionId, _error: &ChatError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
