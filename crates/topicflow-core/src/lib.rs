//! topicflow-core
//!
//! トピックでルーティングし、上限付きで再試行するメッセージ実行エンジン。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, descriptor, message, state, outcome, errors）
//! - **ports**: 抽象化レイヤー（DescriptorProvider, StateStore, CallbackSender, ThresholdCallback, Clock）
//! - **typed**: Subscriber / 型付き Handler API
//! - **routing**: パターンのコンパイル、グループキャッシュ、候補選択
//! - **retry**: バックオフポリシー
//! - **app**: SubscriptionBuilder と RetryExecutor
//! - **impls**: 実装（InMemoryStateStore など開発用）
//! - **config**: 設定の読み込み
//! - **observability**: tracing の初期化と状態集計

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod retry;
pub mod routing;
pub mod typed;
