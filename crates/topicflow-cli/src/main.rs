use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use topicflow_core::app::{RetryExecutor, SubscriptionBuilder};
use topicflow_core::config::ExecutorOptions;
use topicflow_core::domain::{
    HandlerReply, MessageContext, MessageEnvelope, MessageType, SubscriberError, ThresholdError,
};
use topicflow_core::impls::{ChannelCallbackSender, InMemoryStateStore};
use topicflow_core::observability::init_tracing;
use topicflow_core::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};
use topicflow_core::routing::GroupCache;
use topicflow_core::typed::{ConsumerContext, Handler, Subscriber, Topic};

#[derive(Debug, Deserialize)]
struct OrderCreated {
    order_id: u64,
}

impl Topic for OrderCreated {
    const PATTERN: &'static str = "orders.created";
}

struct OrderHandler;

#[async_trait]
impl Handler<OrderCreated> for OrderHandler {
    async fn handle(
        &self,
        input: OrderCreated,
        message: &MessageContext,
    ) -> Result<HandlerReply, SubscriberError> {
        println!("order {} created", input.order_id);
        Ok(HandlerReply::with_callback(
            message.id,
            "orders.created.ack",
            serde_json::json!({ "order_id": input.order_id }),
        ))
    }
}

/// Fails its first `n` calls, whichever messages they belong to.
struct FlakyAuditSubscriber {
    remaining_failures: AtomicU32,
}

impl FlakyAuditSubscriber {
    fn new(n: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl Subscriber for FlakyAuditSubscriber {
    async fn invoke(&self, ctx: &ConsumerContext) -> Result<HandlerReply, SubscriberError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(SubscriberError::failed(format!(
                "intentional failure (left={left})"
            )));
        }
        println!("audit: {} retries={}", ctx.message.name, ctx.message.retries);
        Ok(HandlerReply::done())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    // (A) config: optional file path as the first argument
    let path = std::env::args().nth(1).map(PathBuf::from);
    let options = ExecutorOptions::load(path.as_deref())?;
    tracing::info!(
        config = ?path,
        failed_retry_count = options.failed_retry_count,
        "configuration loaded"
    );

    // (B) register subscriptions and validate at startup
    let provider = SubscriptionBuilder::new(&options)
        .subscribe_topic::<OrderCreated, _>(OrderHandler)?
        .subscribe("audit.#", Arc::new(FlakyAuditSubscriber::new(2)))?
        .expect_topics(&["orders.created", "audit.eu.login"])
        .build()?;

    // (C) wire the executor
    let cache = Arc::new(GroupCache::from_provider(
        &provider,
        options.wildcard_precedence,
    ));
    let store = InMemoryStateStore::new();
    let (callbacks, mut callback_rx) = ChannelCallbackSender::new();
    let threshold = |kind: MessageType, topic: &str, content: &serde_json::Value| {
        println!("threshold reached: {kind:?} {topic} {content}");
        Ok::<(), ThresholdError>(())
    };
    let executor = Arc::new(
        RetryExecutor::new(cache, Arc::new(store.clone()), options.clone())
            .with_callback_sender(Arc::new(callbacks))
            .with_threshold_callback(Arc::new(threshold)),
    );

    let callback_printer = tokio::spawn(async move {
        while let Some(sent) = callback_rx.recv().await {
            println!(
                "callback: {} -> {} {}",
                sent.correlation_id, sent.callback_name, sent.result
            );
        }
    });

    // (D) run messages concurrently
    let ids = UlidGenerator::new(SystemClock);
    let group = options.resolve_group(None);
    let topics = [
        ("orders.created", serde_json::json!({ "order_id": 42 })),
        ("audit.eu.login", serde_json::json!({ "user": "alice" })),
        ("payments.settled", serde_json::json!({ "amount": 10 })),
    ];

    let mut joins = Vec::new();
    for (name, content) in topics {
        let mut message = MessageEnvelope::new(
            ids.generate_message_id(),
            name,
            group.clone(),
            content,
            SystemClock.now(),
        );
        let executor = Arc::clone(&executor);
        joins.push(tokio::spawn(async move {
            let result = executor.execute(&mut message).await;
            (message, result)
        }));
    }

    for join in joins {
        let (message, result) = join.await?;
        println!(
            "final status: topic={} state={} retries={} result={:?}",
            message.name, message.state, message.retries, result?
        );
    }

    println!("counts: {:?}", store.counts().await);

    // (E) drop the executor so the callback channel closes
    drop(executor);
    callback_printer.await?;
    Ok(())
}
