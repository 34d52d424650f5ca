//! Observability - tracing の初期化と状態別の集計

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::MessageState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: usize,
    pub executing: usize,
    pub retrying: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl StateCounts {
    pub fn record(&mut self, state: MessageState) {
        match state {
            MessageState::Pending => self.pending += 1,
            MessageState::Executing => self.executing += 1,
            MessageState::Retrying => self.retrying += 1,
            MessageState::Succeeded => self.succeeded += 1,
            MessageState::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.executing + self.retrying + self.succeeded + self.failed
    }
}

/// Install a fmt subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Safe to call more than once; later calls leave the existing subscriber in
/// place.
pub fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();

    if result.is_err() {
        tracing::debug!("global tracing subscriber already initialized");
    }
}
