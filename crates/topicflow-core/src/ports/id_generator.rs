//! IdGenerator port - ID 生成の抽象化
//!
//! - **UlidGenerator**: Clock の時刻 + ランダム部で ULID を生成

use ulid::Ulid;

use crate::domain::MessageId;
use crate::ports::Clock;

/// Generates IDs that need no coordination between processes.
pub trait IdGenerator: Send + Sync {
    fn generate_message_id(&self) -> MessageId;
}

/// ULID generator; the timestamp part comes from `clock`, so a
/// `FixedClock` makes it deterministic.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_message_id(&self) -> MessageId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        MessageId::from(ulid)
    }
}
