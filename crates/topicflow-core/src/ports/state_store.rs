//! StateStore port - 状態遷移の正本

use async_trait::async_trait;

use crate::domain::{MessageEnvelope, MessageState, StoreError};

/// Persists message state transitions.
///
/// Called once after every attempt. The envelope already carries the updated
/// `retries`, `expires_at` and `content` when this is called; implementations
/// must tolerate the same call being repeated.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn change_state(
        &self,
        message: &MessageEnvelope,
        state: MessageState,
    ) -> Result<(), StoreError>;
}
