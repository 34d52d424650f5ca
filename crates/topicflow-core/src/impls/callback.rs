//! CallbackSender の実装（チャネル転送、ログ出力）

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{CallbackError, MessageId};
use crate::ports::CallbackSender;

/// A reply captured by `ChannelCallbackSender`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCallback {
    pub correlation_id: MessageId,
    pub callback_name: String,
    pub result: serde_json::Value,
}

/// Forwards replies into a tokio channel (the receiving side publishes them).
#[derive(Debug, Clone)]
pub struct ChannelCallbackSender {
    tx: mpsc::UnboundedSender<SentCallback>,
}

impl ChannelCallbackSender {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SentCallback>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl CallbackSender for ChannelCallbackSender {
    async fn send(
        &self,
        correlation_id: MessageId,
        callback_name: &str,
        result: serde_json::Value,
    ) -> Result<(), CallbackError> {
        self.tx
            .send(SentCallback {
                correlation_id,
                callback_name: callback_name.to_string(),
                result,
            })
            .map_err(|_| CallbackError("callback channel closed".to_string()))
    }
}

/// Only logs the reply. Default when nothing publishes callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCallbackSender;

#[async_trait]
impl CallbackSender for LoggingCallbackSender {
    async fn send(
        &self,
        correlation_id: MessageId,
        callback_name: &str,
        result: serde_json::Value,
    ) -> Result<(), CallbackError> {
        tracing::info!(%correlation_id, callback_name, %result, "callback");
        Ok(())
    }
}
