//! InMemoryStateStore - 状態遷移をメモリに記録する StateStore

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{MessageEnvelope, MessageId, MessageState, StoreError};
use crate::observability::StateCounts;
use crate::ports::StateStore;

/// One recorded `change_state` call.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub message_id: MessageId,
    pub name: String,
    pub state: MessageState,
    pub retries: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub content: serde_json::Value,
}

/// Records every transition in call order.
///
/// `fail_writes(true)` makes every subsequent call fail, to exercise the
/// persistence-failure path.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStateStore {
    transitions: Arc<Mutex<Vec<StateTransition>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All transitions, oldest first.
    pub async fn transitions(&self) -> Vec<StateTransition> {
        self.transitions.lock().await.clone()
    }

    /// Transitions of one message, oldest first.
    pub async fn transitions_of(&self, id: MessageId) -> Vec<StateTransition> {
        self.transitions
            .lock()
            .await
            .iter()
            .filter(|t| t.message_id == id)
            .cloned()
            .collect()
    }

    /// Last recorded transition of one message.
    pub async fn latest(&self, id: MessageId) -> Option<StateTransition> {
        self.transitions
            .lock()
            .await
            .iter()
            .rev()
            .find(|t| t.message_id == id)
            .cloned()
    }

    /// Counts of messages by their latest state.
    pub async fn counts(&self) -> StateCounts {
        let transitions = self.transitions.lock().await;
        let mut latest: std::collections::HashMap<MessageId, MessageState> =
            std::collections::HashMap::new();
        for t in transitions.iter() {
            latest.insert(t.message_id, t.state);
        }
        let mut counts = StateCounts::default();
        for state in latest.values() {
            counts.record(*state);
        }
        counts
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn change_state(
        &self,
        message: &MessageEnvelope,
        state: MessageState,
    ) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store set to fail".to_string()));
        }
        let transition = StateTransition {
            message_id: message.id,
            name: message.name.clone(),
            state,
            retries: message.retries,
            expires_at: message.expires_at,
            content: message.content.clone(),
        };
        self.transitions.lock().await.push(transition);
        Ok(())
    }
}
