//! Ports - 抽象化レイヤー
//!
//! 各 trait は executor の外側にある協調者へのインターフェースです。
//! 実装の詳細（永続化、配送、通知）は隠蔽されます。
//!
//! - DescriptorProvider: 起動時に一度だけ購読一覧を返す
//! - StateStore: 状態遷移の記録（正本）
//! - CallbackSender: 成功時の返信配送（best-effort）
//! - ThresholdCallback: リトライ枯渇時の通知

pub mod callback_sender;
pub mod clock;
pub mod descriptor_provider;
pub mod id_generator;
pub mod state_store;
pub mod threshold;

pub use self::callback_sender::CallbackSender;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::descriptor_provider::DescriptorProvider;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::state_store::StateStore;
pub use self::threshold::ThresholdCallback;
