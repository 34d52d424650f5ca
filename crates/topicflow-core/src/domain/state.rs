//! MessageState - メッセージの状態遷移

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a received message.
///
/// State transitions:
/// - Pending -> Executing -> Succeeded
/// - Pending -> Executing -> Retrying -> Executing (loop while retry budget remains)
/// - Pending -> Executing -> Failed (retry budget exhausted)
///
/// Only the post-attempt states (`Retrying`, `Succeeded`, `Failed`) are handed
/// to the `StateStore`; `Pending` and `Executing` live on the envelope only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageState {
    /// Delivered by the transport, not yet attempted.
    Pending,

    /// An attempt is in flight.
    Executing,

    /// The last attempt failed and another one will follow.
    Retrying,

    /// The handler completed.
    Succeeded,

    /// Failed permanently (retry budget exhausted or no subscriber).
    Failed,
}

impl MessageState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, MessageState::Succeeded | MessageState::Failed)
    }

    /// Did the last attempt fail (terminal or not)?
    pub fn is_failure(self) -> bool {
        matches!(self, MessageState::Retrying | MessageState::Failed)
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageState::Pending => "pending",
            MessageState::Executing => "executing",
            MessageState::Retrying => "retrying",
            MessageState::Succeeded => "succeeded",
            MessageState::Failed => "failed",
        };
        f.write_str(s)
    }
}
