//! Routing - トピックキー → 購読 descriptor
//!
//! - **pattern**: ワイルドカード構文とコンパイル
//! - **registry**: 不変のグループ索引と優先順位の規則
//! - **cache**: コンパイル済みパターンのグループ単位並行キャッシュ

pub mod cache;
pub mod pattern;
pub mod registry;

pub use self::cache::GroupCache;
pub use self::pattern::{CompiledPattern, CompiledPatternEntry, PatternTier};
pub use self::registry::{CandidateSelector, CompiledGroup, Registry, WildcardPrecedence};
