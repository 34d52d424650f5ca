//! RetryExecutor - 購読者の解決、実行、メッセージ単位の再試行ループ
//!
//! 再試行は 1 回の `execute` 呼び出しの中で即座に、順番に行います（後回しの
//! スケジューリングはしません）。状態は毎回の試行の後、次の試行の前または
//! `execute` が返る前に永続化します。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::FutureExt;

use crate::config::ExecutorOptions;
use crate::domain::{
    AttemptError, CallbackDirective, ExecutorError, MessageEnvelope, MessageState, MessageType,
    OperateResult, SubscriberError,
};
use crate::impls::LoggingCallbackSender;
use crate::ports::{CallbackSender, Clock, StateStore, SystemClock, ThresholdCallback};
use crate::retry::BackoffPolicy;
use crate::routing::GroupCache;
use crate::typed::ConsumerContext;

/// Result of one attempt after its state has been persisted.
#[derive(Debug)]
enum Step {
    Done,
    Retry,
    GiveUp(AttemptError),
}

pub struct RetryExecutor {
    cache: Arc<GroupCache>,
    store: Arc<dyn StateStore>,
    backoff: Arc<dyn BackoffPolicy>,
    callback_sender: Arc<dyn CallbackSender>,
    threshold_callback: Option<Arc<dyn ThresholdCallback>>,
    clock: Arc<dyn Clock>,
    options: ExecutorOptions,
}

impl RetryExecutor {
    /// Backoff comes from `options.backoff`; callbacks are only logged until a
    /// sender is configured.
    pub fn new(cache: Arc<GroupCache>, store: Arc<dyn StateStore>, options: ExecutorOptions) -> Self {
        Self {
            cache,
            store,
            backoff: Arc::new(options.backoff.to_policy()),
            callback_sender: Arc::new(LoggingCallbackSender),
            threshold_callback: None,
            clock: Arc::new(SystemClock),
            options,
        }
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_callback_sender(mut self, sender: Arc<dyn CallbackSender>) -> Self {
        self.callback_sender = sender;
        self
    }

    pub fn with_threshold_callback(mut self, callback: Arc<dyn ThresholdCallback>) -> Self {
        self.threshold_callback = Some(callback);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<GroupCache> {
        &self.cache
    }

    /// Retry budget actually enforced: `min(failed_retry_count, policy max)`.
    pub fn effective_max_retries(&self) -> u32 {
        self.options
            .failed_retry_count
            .min(self.backoff.max_retries())
    }

    /// Run the message to a terminal state.
    ///
    /// Routing and handler failures end up in `OperateResult::Failed`; only a
    /// malformed message or a state store failure is returned as `Err`.
    ///
    /// Callback replies are spawned onto the current tokio runtime when there
    /// is one; under any other executor they are sent before `execute` returns.
    #[tracing::instrument(
        skip_all,
        fields(message_id = %message.id, topic = %message.name, group = %message.group)
    )]
    pub async fn execute(
        &self,
        message: &mut MessageEnvelope,
    ) -> Result<OperateResult, ExecutorError> {
        validate(message)?;

        loop {
            match self.execute_once(message).await? {
                Step::Done => return Ok(OperateResult::Succeeded),
                Step::Retry => continue,
                Step::GiveUp(err) => return Ok(OperateResult::Failed(err)),
            }
        }
    }

    async fn execute_once(&self, message: &mut MessageEnvelope) -> Result<Step, ExecutorError> {
        message.state = MessageState::Executing;
        let started = Instant::now();

        match self.invoke_once(message).await {
            Ok(()) => {
                self.set_succeeded(message).await?;
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "subscriber executed"
                );
                Ok(Step::Done)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    retries = message.retries,
                    "subscriber execution failed"
                );
                if self.set_failed(message, &err).await? {
                    Ok(Step::Retry)
                } else {
                    Ok(Step::GiveUp(err))
                }
            }
        }
    }

    /// Resolve and invoke the subscriber once.
    async fn invoke_once(&self, message: &MessageEnvelope) -> Result<(), AttemptError> {
        let Some(descriptor) = self.cache.try_resolve(&message.name, &message.group) else {
            tracing::warn!("no subscriber found for message");
            return Err(AttemptError::SubscriberNotFound {
                name: message.name.clone(),
                group: message.group.clone(),
            });
        };

        let ctx = ConsumerContext {
            descriptor: (*descriptor).clone(),
            message: message.to_context(),
        };
        let subscriber = descriptor.subscriber();

        let reply = match AssertUnwindSafe(subscriber.invoke(&ctx)).catch_unwind().await {
            Ok(result) => result?,
            Err(panic) => return Err(SubscriberError::Panicked(panic_message(panic)).into()),
        };

        if let Some(callback) = reply.callback {
            let dispatch = dispatch_callback(Arc::clone(&self.callback_sender), callback);
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(dispatch);
                }
                // No tokio runtime to detach onto: deliver before returning.
                Err(_) => dispatch.await,
            }
        }

        Ok(())
    }

    async fn set_succeeded(&self, message: &mut MessageEnvelope) -> Result<(), ExecutorError> {
        message.expires_at = Some(add_duration(
            self.clock.now(),
            self.options.succeed_message_expired_after(),
        ));
        message.state = MessageState::Succeeded;
        self.store
            .change_state(message, MessageState::Succeeded)
            .await?;
        Ok(())
    }

    /// Record the failure and persist it. Returns whether another attempt
    /// should follow.
    async fn set_failed(
        &self,
        message: &mut MessageEnvelope,
        err: &AttemptError,
    ) -> Result<bool, ExecutorError> {
        message.append_failure(err, self.clock.now());

        if !err.is_retryable() {
            message.retries = self.options.failed_retry_count;
        }

        let retries = message.retries.saturating_add(1);
        message.retries = retries;
        message.expires_at = Some(add_duration(
            message.added_at,
            self.backoff.retry_in(retries),
        ));

        if retries >= self.effective_max_retries() {
            if retries == self.options.failed_retry_count {
                self.notify_threshold(message);
            }
            message.state = MessageState::Failed;
            self.store.change_state(message, MessageState::Failed).await?;
            return Ok(false);
        }

        tracing::info!(retries, "retrying subscriber execution");
        message.state = MessageState::Retrying;
        self.store
            .change_state(message, MessageState::Retrying)
            .await?;
        Ok(true)
    }

    fn notify_threshold(&self, message: &MessageEnvelope) {
        let Some(callback) = &self.threshold_callback else {
            return;
        };

        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            callback.on_threshold(MessageType::Subscribe, &message.name, &message.content)
        }));
        match outcome {
            Ok(Ok(())) => tracing::warn!(
                retries = self.options.failed_retry_count,
                "message reached the failed retry threshold"
            ),
            Ok(Err(err)) => tracing::warn!(error = %err, "threshold callback failed"),
            Err(panic) => tracing::warn!(
                error = %panic_message(panic),
                "threshold callback panicked"
            ),
        }
    }
}

async fn dispatch_callback(sender: Arc<dyn CallbackSender>, callback: CallbackDirective) {
    if let Err(err) = sender
        .send(callback.correlation_id, &callback.callback_name, callback.result)
        .await
    {
        tracing::warn!(
            error = %err,
            correlation_id = %callback.correlation_id,
            callback_name = %callback.callback_name,
            "callback dispatch failed"
        );
    }
}

fn validate(message: &MessageEnvelope) -> Result<(), ExecutorError> {
    if message.name.is_empty() {
        return Err(ExecutorError::InvalidMessage(format!(
            "message {} has an empty topic name",
            message.id
        )));
    }
    if message.group.is_empty() {
        return Err(ExecutorError::InvalidMessage(format!(
            "message {} has an empty group",
            message.id
        )));
    }
    Ok(())
}

fn add_duration(from: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|d| from.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;
    use serde_json::json;
    use ulid::Ulid;

    use super::*;
    use crate::domain::message::FAILURES_KEY;
    use crate::domain::{
        HandlerReply, MessageContext, MessageId, SubscriptionDescriptor, ThresholdError,
    };
    use crate::impls::{ChannelCallbackSender, InMemoryStateStore, StaticDescriptorProvider};
    use crate::ports::FixedClock;
    use crate::retry::ExponentialBackoff;
    use crate::routing::WildcardPrecedence;
    use crate::typed::{Handler, Subscriber, TypedSubscriber};
    use crate::typed::handler::testing::{
        EchoSubscriber, FlakySubscriber, NoopSubscriber, PanickingSubscriber,
    };

    const GROUP: &str = "billing.v1";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    /// Records every threshold invocation.
    #[derive(Default)]
    struct RecordingThreshold {
        calls: Mutex<Vec<(MessageType, String, serde_json::Value)>>,
    }

    impl ThresholdCallback for RecordingThreshold {
        fn on_threshold(
            &self,
            message_type: MessageType,
            topic_name: &str,
            content: &serde_json::Value,
        ) -> Result<(), ThresholdError> {
            self.calls
                .lock()
                .unwrap()
                .push((message_type, topic_name.to_string(), content.clone()));
            Ok(())
        }
    }

    impl RecordingThreshold {
        fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    struct Fixture {
        executor: RetryExecutor,
        store: InMemoryStateStore,
        threshold: Arc<RecordingThreshold>,
    }

    fn fixture(
        subscriptions: Vec<(&str, Arc<dyn Subscriber>)>,
        configured_max: u32,
        policy_max: u32,
    ) -> Fixture {
        let descriptors = subscriptions
            .into_iter()
            .map(|(pattern, sub)| SubscriptionDescriptor::new(pattern, GROUP, sub).unwrap())
            .collect();
        let provider = StaticDescriptorProvider::new(descriptors);
        let cache = Arc::new(GroupCache::from_provider(
            &provider,
            WildcardPrecedence::RegistrationOrder,
        ));
        let store = InMemoryStateStore::new();
        let threshold = Arc::new(RecordingThreshold::default());
        let options = ExecutorOptions {
            failed_retry_count: configured_max,
            ..ExecutorOptions::default()
        };
        let executor = RetryExecutor::new(cache, Arc::new(store.clone()), options)
            .with_backoff(Arc::new(
                ExponentialBackoff::default().with_max_retries(policy_max),
            ))
            .with_threshold_callback(threshold.clone())
            .with_clock(Arc::new(FixedClock::new(t0())));
        Fixture {
            executor,
            store,
            threshold,
        }
    }

    fn noop() -> Arc<dyn Subscriber> {
        Arc::new(NoopSubscriber)
    }

    fn message(name: &str) -> MessageEnvelope {
        MessageEnvelope::new(
            MessageId::from_ulid(Ulid::new()),
            name,
            GROUP,
            json!({ "order_id": 1 }),
            t0(),
        )
    }

    #[tokio::test]
    async fn success_on_first_attempt_persists_one_succeeded_transition() {
        let f = fixture(vec![("orders.created", noop())], 3, 3);
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert_eq!(result, OperateResult::Succeeded);
        assert_eq!(msg.state, MessageState::Succeeded);
        assert_eq!(msg.retries, 0);
        assert_eq!(msg.expires_at, Some(t0() + chrono::Duration::hours(24)));
        let transitions = f.store.transitions_of(msg.id).await;
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].state, MessageState::Succeeded);
    }

    #[tokio::test]
    async fn exact_subscription_wins_over_earlier_wildcard() {
        let wildcard = Arc::new(FlakySubscriber::always_failing());
        let f = fixture(
            vec![
                ("orders.*", wildcard.clone() as Arc<dyn Subscriber>),
                ("orders.created", noop()),
            ],
            3,
            3,
        );
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert!(result.is_success());
        assert_eq!(wildcard.calls(), 0);
    }

    #[tokio::test]
    async fn three_failures_exhaust_budget_and_fire_threshold_once() {
        let sub = Arc::new(FlakySubscriber::always_failing());
        let f = fixture(vec![("orders.*", sub.clone() as Arc<dyn Subscriber>)], 3, 3);
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert!(matches!(result, OperateResult::Failed(AttemptError::Handler(_))));
        assert_eq!(sub.calls(), 3);
        assert_eq!(msg.retries, 3);
        assert_eq!(msg.state, MessageState::Failed);
        assert_eq!(f.threshold.count(), 1);

        let calls = f.threshold.calls.lock().unwrap().clone();
        assert_eq!(calls[0].0, MessageType::Subscribe);
        assert_eq!(calls[0].1, "orders.created");
        assert_eq!(calls[0].2[FAILURES_KEY].as_array().unwrap().len(), 3);

        let states: Vec<MessageState> = f
            .store
            .transitions_of(msg.id)
            .await
            .iter()
            .map(|t| t.state)
            .collect();
        assert_eq!(
            states,
            vec![
                MessageState::Retrying,
                MessageState::Retrying,
                MessageState::Failed
            ]
        );
    }

    #[tokio::test]
    async fn recovery_on_second_attempt() {
        let sub = Arc::new(FlakySubscriber::new(1));
        let f = fixture(vec![("orders.created", sub.clone() as Arc<dyn Subscriber>)], 3, 3);
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert_eq!(result, OperateResult::Succeeded);
        assert_eq!(sub.calls(), 2);
        assert_eq!(f.threshold.count(), 0);
        let transitions = f.store.transitions_of(msg.id).await;
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].state, MessageState::Retrying);
        assert_eq!(transitions[0].retries, 1);
        assert_eq!(transitions[1].state, MessageState::Succeeded);
        // failure reasons survive the eventual success
        assert_eq!(msg.failures().len(), 1);
        assert_eq!(msg.content["order_id"], 1);
    }

    #[tokio::test]
    async fn subscriber_not_found_fails_immediately() {
        let f = fixture(vec![("orders.created", noop())], 50, 50);
        let mut msg = message("payments.settled");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert!(matches!(
            result,
            OperateResult::Failed(AttemptError::SubscriberNotFound { .. })
        ));
        assert_eq!(msg.state, MessageState::Failed);
        assert_eq!(msg.retries, 51);
        assert_eq!(f.threshold.count(), 0);
        let transitions = f.store.transitions_of(msg.id).await;
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].state, MessageState::Failed);
        assert_eq!(msg.failures()[0]["kind"], "subscriber_not_found");
    }

    #[tokio::test]
    async fn unknown_group_is_subscriber_not_found() {
        let f = fixture(vec![("orders.created", noop())], 3, 3);
        let mut msg = message("orders.created");
        msg.group = "other.v1".to_string();

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert!(matches!(
            result,
            OperateResult::Failed(AttemptError::SubscriberNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn policy_max_caps_retries_without_threshold_callback() {
        let sub = Arc::new(FlakySubscriber::always_failing());
        let f = fixture(vec![("orders.created", sub.clone() as Arc<dyn Subscriber>)], 50, 2);
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert!(!result.is_success());
        assert_eq!(sub.calls(), 2);
        assert_eq!(f.executor.effective_max_retries(), 2);
        // threshold only fires at the configured max
        assert_eq!(f.threshold.count(), 0);
    }

    #[tokio::test]
    async fn expiry_follows_backoff_from_added_at() {
        let sub = Arc::new(FlakySubscriber::always_failing());
        let f = fixture(vec![("orders.created", sub as Arc<dyn Subscriber>)], 3, 3);
        let mut msg = message("orders.created");

        f.executor.execute(&mut msg).await.unwrap();

        let expiries: Vec<Option<DateTime<Utc>>> = f
            .store
            .transitions_of(msg.id)
            .await
            .iter()
            .map(|t| t.expires_at)
            .collect();
        assert_eq!(
            expiries,
            vec![
                Some(t0() + chrono::Duration::seconds(2)),
                Some(t0() + chrono::Duration::seconds(4)),
                Some(t0() + chrono::Duration::seconds(8)),
            ]
        );
    }

    #[tokio::test]
    async fn panicking_subscriber_is_a_handler_failure() {
        let sub: Arc<dyn Subscriber> = Arc::new(PanickingSubscriber);
        let f = fixture(vec![("orders.created", sub)], 1, 3);
        let mut msg = message("orders.created");

        let result = f.executor.execute(&mut msg).await.unwrap();

        match result {
            OperateResult::Failed(AttemptError::Handler(SubscriberError::Panicked(reason))) => {
                assert!(reason.contains("handler exploded"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(f.threshold.count(), 1);
    }

    #[tokio::test]
    async fn threshold_callback_errors_are_swallowed() {
        let sub = Arc::new(FlakySubscriber::always_failing());
        let descriptors = vec![SubscriptionDescriptor::new("orders.created", GROUP, sub).unwrap()];
        let provider = StaticDescriptorProvider::new(descriptors);
        let cache = Arc::new(GroupCache::from_provider(&provider, WildcardPrecedence::default()));
        let store = InMemoryStateStore::new();
        let invoked = Arc::new(AtomicU32::new(0));
        let counter = invoked.clone();
        let callback =
            move |_: MessageType, _: &str, _: &serde_json::Value| -> Result<(), ThresholdError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ThresholdError("mail server down".to_string()))
            };
        let options = ExecutorOptions {
            failed_retry_count: 2,
            ..ExecutorOptions::default()
        };
        let executor = RetryExecutor::new(cache, Arc::new(store.clone()), options)
            .with_threshold_callback(Arc::new(callback));

        let mut msg = message("orders.created");
        let result = executor.execute(&mut msg).await.unwrap();

        assert!(!result.is_success());
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.latest(msg.id).await.map(|t| t.state),
            Some(MessageState::Failed)
        );
    }

    #[tokio::test]
    async fn panicking_threshold_callback_does_not_block_terminal_state() {
        let sub = Arc::new(FlakySubscriber::always_failing());
        let descriptors = vec![SubscriptionDescriptor::new("orders.created", GROUP, sub).unwrap()];
        let provider = StaticDescriptorProvider::new(descriptors);
        let cache = Arc::new(GroupCache::from_provider(&provider, WildcardPrecedence::default()));
        let store = InMemoryStateStore::new();
        let callback = |_: MessageType, _: &str, _: &serde_json::Value| -> Result<(), ThresholdError> {
            panic!("callback exploded")
        };
        let options = ExecutorOptions {
            failed_retry_count: 1,
            ..ExecutorOptions::default()
        };
        let executor = RetryExecutor::new(cache, Arc::new(store.clone()), options)
            .with_threshold_callback(Arc::new(callback));

        let mut msg = message("orders.created");
        let result = executor.execute(&mut msg).await.unwrap();

        assert!(!result.is_success());
        assert_eq!(
            store.latest(msg.id).await.map(|t| t.state),
            Some(MessageState::Failed)
        );
    }

    #[tokio::test]
    async fn persistence_failure_propagates() {
        let f = fixture(vec![("orders.created", noop())], 3, 3);
        f.store.fail_writes(true);
        let mut msg = message("orders.created");

        let err = f.executor.execute(&mut msg).await.unwrap_err();

        assert!(matches!(err, ExecutorError::Persistence(_)));
    }

    #[tokio::test]
    async fn empty_topic_name_is_rejected_before_any_attempt() {
        let sub = Arc::new(FlakySubscriber::new(0));
        let f = fixture(vec![("orders.created", sub.clone() as Arc<dyn Subscriber>)], 3, 3);
        let mut msg = message("");

        let err = f.executor.execute(&mut msg).await.unwrap_err();

        assert!(matches!(err, ExecutorError::InvalidMessage(_)));
        assert_eq!(sub.calls(), 0);
        assert!(f.store.transitions().await.is_empty());
    }

    #[tokio::test]
    async fn callback_directive_is_dispatched() {
        let (sender, mut rx) = ChannelCallbackSender::new();
        let sub: Arc<dyn Subscriber> = Arc::new(EchoSubscriber {
            callback_name: "orders.ack".to_string(),
        });
        let f = fixture(vec![("orders.#", sub)], 3, 3);
        let executor = f.executor.with_callback_sender(Arc::new(sender));
        let mut msg = message("orders.eu.created");

        let result = executor.execute(&mut msg).await.unwrap();
        assert!(result.is_success());

        let sent = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sent.correlation_id, msg.id);
        assert_eq!(sent.callback_name, "orders.ack");
        assert_eq!(sent.result, json!({ "order_id": 1 }));
    }

    #[derive(Debug, serde::Deserialize)]
    struct Note {
        body: String,
    }

    /// Fails its first call, then records what it decoded.
    #[derive(Default)]
    struct NoteHandler {
        calls: AtomicU32,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Handler<Note> for Arc<NoteHandler> {
        async fn handle(
            &self,
            input: Note,
            _message: &MessageContext,
        ) -> Result<HandlerReply, SubscriberError> {
            self.seen.lock().unwrap().push(input.body);
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SubscriberError::failed("first delivery rejected"));
            }
            Ok(HandlerReply::done())
        }
    }

    #[tokio::test]
    async fn typed_handler_recovers_on_second_attempt_with_body_field() {
        let handler = Arc::new(NoteHandler::default());
        let sub: Arc<dyn Subscriber> =
            Arc::new(TypedSubscriber::<Note, _>::new(Arc::clone(&handler)));
        let f = fixture(vec![("notes.created", sub)], 3, 3);
        let mut msg = MessageEnvelope::new(
            MessageId::from_ulid(Ulid::new()),
            "notes.created",
            GROUP,
            json!({ "body": "hi" }),
            t0(),
        );

        let result = f.executor.execute(&mut msg).await.unwrap();

        assert_eq!(result, OperateResult::Succeeded);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["hi", "hi"]);
        assert_eq!(msg.content["body"], "hi");
        assert_eq!(msg.failures().len(), 1);
        assert_eq!(msg.failures()[0]["kind"], "handler_failed");
        assert_eq!(f.store.transitions_of(msg.id).await.len(), 2);
    }

    #[test]
    fn callback_is_sent_inline_without_a_tokio_runtime() {
        let (sender, mut rx) = ChannelCallbackSender::new();
        let sub: Arc<dyn Subscriber> = Arc::new(EchoSubscriber {
            callback_name: "orders.ack".to_string(),
        });
        let f = fixture(vec![("orders.created", sub)], 3, 3);
        let executor = f.executor.with_callback_sender(Arc::new(sender));
        let mut msg = message("orders.created");

        let result = futures::executor::block_on(executor.execute(&mut msg)).unwrap();

        assert!(result.is_success());
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.correlation_id, msg.id);
        assert_eq!(sent.callback_name, "orders.ack");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn messages_run_concurrently_on_a_shared_executor() {
        let sub: Arc<dyn Subscriber> = Arc::new(NoopSubscriber);
        let f = fixture(vec![("orders.*", sub)], 3, 3);
        let executor = Arc::new(f.executor);

        let mut joins = Vec::new();
        for i in 0..16 {
            let executor = Arc::clone(&executor);
            joins.push(tokio::spawn(async move {
                let mut msg = message(&format!("orders.item_{i}"));
                executor.execute(&mut msg).await.unwrap()
            }));
        }
        for join in joins {
            assert!(join.await.unwrap().is_success());
        }

        assert_eq!(f.store.counts().await.succeeded, 16);
    }
}
