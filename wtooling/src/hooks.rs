//! Dispatch observation hooks.
//!
//! ```rust
//! use wtooling::{DispatchHooks, NoopDispatchHooks};
//!
//! fn accepts_hooks(_hooks: &dyn DispatchHooks) {}
//!
//! let hooks = NoopDispatchHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use wprovider::ToolCall;

use crate::{DispatchContext, DispatchOutcome, ToolError};

pub trait DispatchHooks: Send + Sync {
    fn on_dispatch_start(&self, _call: &ToolCall, _context: &DispatchContext) {}

    fn on_dispatch_success(
        &self,
        _call: &ToolCall,
        _context: &DispatchContext,
        _outcome: &DispatchOutcome,
        _elapsed: Duration,
    ) {
    }

    fn on_dispatch_failure(
        &self,
        _call: &ToolCall,
        _context: &DispatchContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatchHooks;

impl DispatchHooks for NoopDispatchHooks {}
