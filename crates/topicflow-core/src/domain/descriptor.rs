//! SubscriptionDescriptor - (pattern, group, subscriber) の組

use std::fmt;
use std::sync::Arc;

use super::errors::RegistrationError;
use crate::typed::Subscriber;

/// One registered subscription. Immutable once built.
///
/// `group` is the fully resolved group name (declared or default group plus
/// the version suffix), see `ExecutorOptions::resolve_group`.
#[derive(Clone)]
pub struct SubscriptionDescriptor {
    pattern: String,
    group: String,
    subscriber: Arc<dyn Subscriber>,
}

impl SubscriptionDescriptor {
    pub fn new(
        pattern: impl Into<String>,
        group: impl Into<String>,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Self, RegistrationError> {
        let pattern = pattern.into();
        let group = group.into();
        if pattern.is_empty() {
            return Err(RegistrationError::EmptyPattern);
        }
        if group.is_empty() {
            return Err(RegistrationError::EmptyGroup(pattern));
        }
        Ok(Self {
            pattern,
            group,
            subscriber,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn subscriber(&self) -> &Arc<dyn Subscriber> {
        &self.subscriber
    }

    /// Contains a `*` single-segment wildcard.
    pub fn has_single_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }

    /// Contains a `#` multi-segment wildcard.
    pub fn has_multi_wildcard(&self) -> bool {
        self.pattern.contains('#')
    }
}

impl fmt::Debug for SubscriptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionDescriptor")
            .field("pattern", &self.pattern)
            .field("group", &self.group)
            .field("subscriber", &self.subscriber.name())
            .finish()
    }
}
