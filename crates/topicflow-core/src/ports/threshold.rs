//! ThresholdCallback port - リトライ枯渇時の通知

use crate::domain::{MessageType, ThresholdError};

/// Invoked once when a message's retry budget is exhausted at the configured
/// threshold.
///
/// Errors (and panics) are logged by the executor and never propagated.
pub trait ThresholdCallback: Send + Sync {
    fn on_threshold(
        &self,
        message_type: MessageType,
        topic_name: &str,
        content: &serde_json::Value,
    ) -> Result<(), ThresholdError>;
}

impl<F> ThresholdCallback for F
where
    F: Fn(MessageType, &str, &serde_json::Value) -> Result<(), ThresholdError> + Send + Sync,
{
    fn on_threshold(
        &self,
        message_type: MessageType,
        topic_name: &str,
        content: &serde_json::Value,
    ) -> Result<(), ThresholdError> {
        self(message_type, topic_name, content)
    }
}
