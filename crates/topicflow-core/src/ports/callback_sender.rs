//! CallbackSender port - 成功時の返信配送

use async_trait::async_trait;

use crate::domain::{MessageId, CallbackError};

/// Publishes the reply a subscriber asked for.
///
/// Best-effort: the executor does not wait on it and does not look at the
/// result beyond logging it.
#[async_trait]
pub trait CallbackSender: Send + Sync {
    async fn send(
        &self,
        correlation_id: MessageId,
        callback_name: &str,
        result: serde_json::Value,
    ) -> Result<(), CallbackError>;
}
