//! SubscriptionBuilder - 購読の登録と起動時検証
//!
//! 登録エラーは呼び出しごとに返します。`expect_topics()` で宣言したトピックは
//! `build()` で一度だけ、executor と同じルーティング規則（exact → `*` → `#`）で
//! 解決できるかを検証します。

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ExecutorOptions;
use crate::domain::{RegistrationError, SubscriptionDescriptor};
use crate::impls::StaticDescriptorProvider;
use crate::routing::{GroupCache, Registry, pattern};
use crate::typed::{Handler, Subscriber, Topic, TypedSubscriber};

/// Collects subscriptions and produces the descriptor list.
///
/// # Example
/// ```ignore
/// let provider = SubscriptionBuilder::new(&options)
///     .subscribe_topic::<OrderCreated, _>(OrderHandler)?
///     .subscribe("audit.#", Arc::new(AuditSubscriber))?
///     .expect_topics(&["orders.created", "audit.eu.login"])
///     .build()?;
/// ```
pub struct SubscriptionBuilder {
    options: ExecutorOptions,
    descriptors: Vec<SubscriptionDescriptor>,
    registered: HashSet<(String, String)>,
    expected_topics: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing topics: {0:?}. No subscription matches these topics in any group.")]
    MissingTopics(Vec<String>),
}

impl SubscriptionBuilder {
    pub fn new(options: &ExecutorOptions) -> Self {
        Self {
            options: options.clone(),
            descriptors: Vec::new(),
            registered: HashSet::new(),
            expected_topics: None,
        }
    }

    /// Subscribe in the default group.
    pub fn subscribe(
        self,
        pattern: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Self, RegistrationError> {
        self.add(pattern, None, subscriber)
    }

    /// Subscribe in `group`; the configured version suffix is appended.
    pub fn subscribe_in_group(
        self,
        pattern: &str,
        group: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Self, RegistrationError> {
        if group.is_empty() {
            return Err(RegistrationError::EmptyGroup(pattern.to_string()));
        }
        self.add(pattern, Some(group), subscriber)
    }

    /// Subscribe a typed handler in the default group.
    pub fn subscribe_typed<T, H>(
        self,
        pattern: &str,
        handler: H,
    ) -> Result<Self, RegistrationError>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
        H: Handler<T> + 'static,
    {
        self.add(pattern, None, Arc::new(TypedSubscriber::<T, H>::new(handler)))
    }

    /// Subscribe a handler under the pattern and group declared by `T`.
    pub fn subscribe_topic<T: Topic, H: Handler<T> + 'static>(
        self,
        handler: H,
    ) -> Result<Self, RegistrationError> {
        self.add(
            T::PATTERN,
            T::GROUP,
            Arc::new(TypedSubscriber::<T, H>::new(handler)),
        )
    }

    pub fn expect_topics(mut self, topics: &[&str]) -> Self {
        self.expected_topics = Some(topics.iter().map(|t| t.to_string()).collect());
        self
    }

    fn add(
        mut self,
        pattern: &str,
        group: Option<&str>,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<Self, RegistrationError> {
        pattern::validate(pattern)?;
        let group = self.options.resolve_group(group);

        if !self
            .registered
            .insert((pattern.to_string(), group.clone()))
        {
            return Err(RegistrationError::AlreadyRegistered {
                pattern: pattern.to_string(),
                group,
            });
        }

        let descriptor = SubscriptionDescriptor::new(pattern, group, subscriber)?;
        tracing::debug!(
            pattern = descriptor.pattern(),
            group = descriptor.group(),
            subscriber = descriptor.subscriber().name(),
            "subscription registered"
        );
        self.descriptors.push(descriptor);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Fail fast when an expected topic would not route anywhere.
    pub fn build(self) -> Result<StaticDescriptorProvider, BuildError> {
        if let Some(expected) = &self.expected_topics {
            let cache = GroupCache::new(
                Registry::new(self.descriptors.clone()),
                self.options.wildcard_precedence,
            );
            let groups = cache.groups();
            let missing: Vec<String> = expected
                .iter()
                .filter(|topic| {
                    !groups
                        .iter()
                        .any(|group| cache.try_resolve(topic, group).is_some())
                })
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingTopics(missing));
            }
        }

        tracing::info!(subscriptions = self.descriptors.len(), "subscriptions built");
        Ok(StaticDescriptorProvider::new(self.descriptors))
    }
}
