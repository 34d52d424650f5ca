//! Subscriber / Handler trait
//!
//! - `Subscriber`: object-safe。descriptor には `Arc<dyn Subscriber>` として保持
//! - `Handler<T>`: 型付きの表層。`TypedSubscriber<T, H>` が content を `T` に
//!   デコードして `Subscriber` に型消去します

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::{HandlerReply, MessageContext, SubscriberError, SubscriptionDescriptor};

/// Everything a subscriber gets for one invocation.
#[derive(Debug, Clone)]
pub struct ConsumerContext {
    pub descriptor: SubscriptionDescriptor,
    pub message: MessageContext,
}

/// Object-safe subscriber invoked by the executor.
///
/// # Example
/// ```ignore
/// struct AuditSubscriber;
///
/// #[async_trait]
/// impl Subscriber for AuditSubscriber {
///     async fn invoke(&self, ctx: &ConsumerContext) -> Result<HandlerReply, SubscriberError> {
///         tracing::info!(topic = %ctx.message.name, "audit");
///         Ok(HandlerReply::done())
///     }
/// }
/// ```
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn invoke(&self, ctx: &ConsumerContext) -> Result<HandlerReply, SubscriberError>;

    /// Name used in logs and `Debug` output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Typed handler: receives the decoded content.
#[async_trait]
pub trait Handler<T>: Send + Sync
where
    T: DeserializeOwned + Send + 'static,
{
    async fn handle(
        &self,
        input: T,
        message: &MessageContext,
    ) -> Result<HandlerReply, SubscriberError>;
}

pub struct TypedSubscriber<T, H> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T, H> TypedSubscriber<T, H>
where
    T: DeserializeOwned + Send + 'static,
    H: Handler<T>,
{
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, H> Subscriber for TypedSubscriber<T, H>
where
    T: DeserializeOwned + Send + 'static,
    H: Handler<T>,
{
    async fn invoke(&self, ctx: &ConsumerContext) -> Result<HandlerReply, SubscriberError> {
        let input: T = serde_json::from_value(ctx.message.payload())
            .map_err(|e| SubscriberError::Decode(e.to_string()))?;
        self.handler.handle(input, &ctx.message).await
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<H>()
    }
}
