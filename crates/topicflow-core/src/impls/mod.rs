//! Impls - ports の実装（開発用・テスト用）
//!
//! - **StaticDescriptorProvider**: 明示登録された購読一覧
//! - **InMemoryStateStore**: 状態遷移をメモリに記録
//! - **ChannelCallbackSender** / **LoggingCallbackSender**: 返信の配送

pub mod callback;
pub mod memory_store;
pub mod static_provider;

pub use self::callback::{ChannelCallbackSender, LoggingCallbackSender, SentCallback};
pub use self::memory_store::{InMemoryStateStore, StateTransition};
pub use self::static_provider::StaticDescriptorProvider;
