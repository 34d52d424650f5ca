//! App - アプリケーション層
//!
//! ports と routing を組み合わせてメッセージ実行を組み立てます。
//!
//! - **SubscriptionBuilder**: 購読の登録と起動時検証
//! - **RetryExecutor**: 解決→実行→状態遷移の再試行ループ

pub mod builder;
pub mod executor;

pub use self::builder::{BuildError, SubscriptionBuilder};
pub use self::executor::RetryExecutor;
