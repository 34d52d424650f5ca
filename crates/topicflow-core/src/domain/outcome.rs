//! Outcome - ハンドラの返り値と executor の実行結果

use serde::{Deserialize, Serialize};

use super::errors::AttemptError;
use super::ids::MessageId;

/// Final result of `RetryExecutor::execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperateResult {
    Succeeded,

    /// Retry budget exhausted; carries the last attempt's failure.
    Failed(AttemptError),
}

impl OperateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OperateResult::Succeeded)
    }

    pub fn error(&self) -> Option<&AttemptError> {
        match self {
            OperateResult::Succeeded => None,
            OperateResult::Failed(err) => Some(err),
        }
    }
}

/// Request to publish a reply once the subscriber has succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackDirective {
    pub correlation_id: MessageId,
    pub callback_name: String,
    pub result: serde_json::Value,
}

/// What a subscriber returns on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<CallbackDirective>,
}

impl HandlerReply {
    pub fn done() -> Self {
        Self::default()
    }

    /// Reply to `callback_name` with `result`, correlated to `correlation_id`.
    pub fn with_callback(
        correlation_id: MessageId,
        callback_name: impl Into<String>,
        result: serde_json::Value,
    ) -> Self {
        Self {
            callback: Some(CallbackDirective {
                correlation_id,
                callback_name: callback_name.into(),
                result,
            }),
        }
    }
}
