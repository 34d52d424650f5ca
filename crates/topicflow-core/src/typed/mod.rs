//! Typed - 購読者 API
//!
//! # 二層構造
//! - **表層（Typed）**: `Topic` trait, `Handler<T>` trait - 型安全
//! - **内部（Dyn）**: `Subscriber` trait - object-safe, type erasure

pub mod handler;
pub mod topic;

pub use self::handler::{ConsumerContext, Handler, Subscriber, TypedSubscriber};
pub use self::topic::Topic;
