//! Retry - 失敗したメッセージのバックオフポリシー

mod policy;

pub use policy::{BackoffPolicy, ExponentialBackoff};
