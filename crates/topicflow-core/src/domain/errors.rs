//! Errors - エラー型と分類
//!
//! - `AttemptError`: 1 回の試行の失敗（ルーティング失敗またはハンドラ失敗）。
//!   `RetryExecutor::execute` の外には出ず、`OperateResult` に入ります。
//! - `ExecutorError`: 呼び出し元に返るエラー（不正な入力、永続化の失敗）。

use thiserror::Error;

/// Failure reported by a subscriber while handling a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberError {
    /// The message content could not be decoded into the handler's input type.
    #[error("payload decode: {0}")]
    Decode(String),

    #[error("{0}")]
    Failed(String),

    /// The handler future panicked.
    #[error("subscriber panicked: {0}")]
    Panicked(String),
}

impl SubscriberError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Failure of a single execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// Routing miss: nothing in the group matches the topic. Not retryable.
    #[error("no subscriber found for topic={name} group={group}")]
    SubscriberNotFound { name: String, group: String },

    /// The handler body failed. Retryable up to the effective maximum.
    #[error("subscriber invocation failed: {0}")]
    Handler(#[from] SubscriberError),
}

impl AttemptError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::SubscriberNotFound { .. })
    }

    /// Short tag recorded next to the failure reason in the message content.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::SubscriberNotFound { .. } => "subscriber_not_found",
            AttemptError::Handler(SubscriberError::Decode(_)) => "decode",
            AttemptError::Handler(SubscriberError::Failed(_)) => "handler_failed",
            AttemptError::Handler(SubscriberError::Panicked(_)) => "handler_panicked",
        }
    }
}

/// Failure of the external state store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of the callback sender. Logged by the spawned dispatch task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("callback send failed: {0}")]
pub struct CallbackError(pub String);

/// Error raised by a threshold callback. Logged and discarded by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("threshold callback failed: {0}")]
pub struct ThresholdError(pub String);

/// Errors raised while registering subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("subscription pattern cannot be empty")]
    EmptyPattern,

    #[error("subscription group cannot be empty (pattern={0})")]
    EmptyGroup(String),

    #[error("invalid subscription pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("pattern '{pattern}' is already registered in group '{group}'")]
    AlreadyRegistered { pattern: String, group: String },
}

/// Errors that escape `RetryExecutor::execute`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Precondition violation at entry (empty topic name or group, ...).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_not_found_is_not_retryable() {
        let err = AttemptError::SubscriberNotFound {
            name: "orders.created".to_string(),
            group: "billing.v1".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "subscriber_not_found");
        assert!(err.to_string().contains("orders.created"));
    }

    #[test]
    fn handler_failure_is_retryable() {
        let err: AttemptError = SubscriberError::failed("boom").into();
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "handler_failed");
        assert_eq!(err.to_string(), "subscriber invocation failed: boom");
    }

    #[test]
    fn store_error_converts_into_executor_error() {
        let err: ExecutorError = StoreError::Unavailable("down".to_string()).into();
        assert!(matches!(err, ExecutorError::Persistence(_)));
        assert_eq!(err.to_string(), "state store unavailable: down");
    }
}
