//! Config - executor の設定
//!
//! 読み込み順: 組み込みのデフォルト → 任意の設定ファイル（拡張子で形式を判定）
//! → `TOPICFLOW_*` 環境変数。ネストしたキーは `__` で区切ります
//! （例: `TOPICFLOW_BACKOFF__MAX_RETRIES=5`）。

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::ExponentialBackoff;
use crate::routing::WildcardPrecedence;

pub const ENV_PREFIX: &str = "TOPICFLOW";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffOptions {
    pub base_delay_secs: u64,
    pub multiplier: f64,
    pub max_delay_secs: u64,
    /// Policy-side retry bound (the executor uses the smaller of this and
    /// `failed_retry_count`).
    pub max_retries: u32,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            base_delay_secs: 2,
            multiplier: 2.0,
            max_delay_secs: 3600,
            max_retries: 3,
        }
    }
}

impl BackoffOptions {
    pub fn to_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_secs(self.base_delay_secs),
            self.multiplier,
            Duration::from_secs(self.max_delay_secs),
            self.max_retries,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    /// Retry threshold; the threshold callback fires when a message reaches
    /// exactly this many retries.
    pub failed_retry_count: u32,

    /// How long a succeeded message is kept.
    pub succeed_message_expired_after_secs: u64,

    /// Group used by subscriptions that do not declare one.
    pub default_group: String,

    /// Suffix appended to every group name.
    pub version: String,

    pub wildcard_precedence: WildcardPrecedence,

    pub backoff: BackoffOptions,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            failed_retry_count: 50,
            succeed_message_expired_after_secs: 24 * 3600,
            default_group: "topicflow.queue".to_string(),
            version: "v1".to_string(),
            wildcard_precedence: WildcardPrecedence::RegistrationOrder,
            backoff: BackoffOptions::default(),
        }
    }
}

impl ExecutorOptions {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let options: ExecutorOptions = builder.build()?.try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_group.is_empty() {
            return Err(ConfigError::Invalid("default_group cannot be empty".to_string()));
        }
        if self.version.is_empty() {
            return Err(ConfigError::Invalid("version cannot be empty".to_string()));
        }
        Ok(())
    }

    /// `"{group}.{version}"`, falling back to `default_group`.
    pub fn resolve_group(&self, declared: Option<&str>) -> String {
        let group = declared
            .filter(|g| !g.is_empty())
            .unwrap_or(self.default_group.as_str());
        format!("{group}.{}", self.version)
    }

    pub fn succeed_message_expired_after(&self) -> Duration {
        Duration::from_secs(self.succeed_message_expired_after_secs)
    }
}
