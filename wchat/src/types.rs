//! Turn state and result types.

use serde_json::Value;

/// Where the single in-flight turn currently stands. A new submission is
/// only accepted from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    StreamingAnswer,
    ExecutingTool,
    StreamingToolAnswer,
}

/// What a settled turn produced. `assistant_text` is the final assistant
/// message: the tool narration when a tool ran, the direct answer otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub assistant_text: String,
    pub tool_invoked: Option<String>,
    pub tool_payload: Option<Value>,
}
