//! Message - 受信メッセージの envelope と購読者に渡す読み取り専用ビュー
//!
//! 失敗理由は予約キー（`FAILURES_KEY`）の下に追記し、ユーザーのキーとは
//! 衝突させません。オブジェクト以外の content は予約キー `BODY_KEY` で包みます。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::errors::AttemptError;
use super::ids::MessageId;
use super::state::MessageState;

/// Reserved key under which failure reasons accumulate in the content.
pub const FAILURES_KEY: &str = "_topicflow_failures";

/// Reserved key holding the delivered content when it was not a JSON object.
pub const BODY_KEY: &str = "_topicflow_body";

/// Which side of the bus a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Publish,
    Subscribe,
}

/// A message delivered by the transport for one subscriber group.
///
/// The executor mutates `content`, `retries`, `expires_at` and `state` while
/// it runs; everything else is fixed at delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub id: MessageId,
    pub name: String,
    pub group: String,
    pub content: Value,
    pub retries: u32,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub state: MessageState,
}

impl MessageEnvelope {
    pub fn new(
        id: MessageId,
        name: impl Into<String>,
        group: impl Into<String>,
        content: Value,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            group: group.into(),
            content,
            retries: 0,
            added_at,
            expires_at: None,
            state: MessageState::Pending,
        }
    }

    /// Read-only snapshot handed to the subscriber.
    pub fn to_context(&self) -> MessageContext {
        MessageContext {
            id: self.id,
            name: self.name.clone(),
            group: self.group.clone(),
            content: self.content.clone(),
            retries: self.retries,
        }
    }

    /// Append a failure reason to the content, keeping whatever was there.
    ///
    /// Object content gets (or extends) a `FAILURES_KEY` array and keeps
    /// every other key untouched. Anything else, `null` included, is wrapped
    /// as `{ BODY_KEY: <prior>, FAILURES_KEY: [...] }`.
    pub fn append_failure(&mut self, error: &AttemptError, at: DateTime<Utc>) {
        let record = json!({
            "attempt": self.retries.saturating_add(1),
            "kind": error.kind(),
            "message": error.to_string(),
            "at": at.to_rfc3339(),
        });

        if !self.content.is_object() {
            let prior = self.content.take();
            let mut wrapped = Map::new();
            wrapped.insert(BODY_KEY.to_string(), prior);
            self.content = Value::Object(wrapped);
        }

        if let Value::Object(map) = &mut self.content {
            let failures = map
                .entry(FAILURES_KEY)
                .or_insert_with(|| Value::Array(Vec::new()));
            match failures {
                Value::Array(items) => items.push(record),
                other => {
                    let existing = other.take();
                    *other = Value::Array(vec![existing, record]);
                }
            }
        }
    }

    /// Failure reasons recorded so far (empty if none).
    pub fn failures(&self) -> &[Value] {
        self.content
            .get(FAILURES_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// What a subscriber sees of the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    pub id: MessageId,
    pub name: String,
    pub group: String,
    pub content: Value,
    pub retries: u32,
}

impl MessageContext {
    /// The payload as originally delivered, without the failure bookkeeping
    /// added by earlier attempts.
    ///
    /// Only the exact `{ BODY_KEY, FAILURES_KEY }` wrapper is unwrapped;
    /// other objects just lose the `FAILURES_KEY` entry.
    pub fn payload(&self) -> Value {
        let Value::Object(map) = &self.content else {
            return self.content.clone();
        };
        if !map.contains_key(FAILURES_KEY) {
            return self.content.clone();
        }
        if let (2, Some(body)) = (map.len(), map.get(BODY_KEY)) {
            return body.clone();
        }
        let mut stripped = map.clone();
        stripped.remove(FAILURES_KEY);
        Value::Object(stripped)
    }
}
