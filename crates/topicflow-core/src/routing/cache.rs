//! GroupCache - Registry の上に載る、グループ単位の並行キャッシュ
//!
//! グループのワイルドカードパターンは、exact で見つからなかった最初の検索時に
//! 遅延コンパイルし、スナップショットの寿命の間保持します。未コンパイルの
//! グループで検索が競合すると両方がコンパイルすることがありますが、最初の
//! 挿入が勝ち、負けた側は捨てられます（`entry().or_insert_with`）。読み手が
//! 作りかけの集合や重複を見ることはありません。
//!
//! `rebuild` は新しい Registry と空のコンパイル済みテーブルを差し替えます。

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use super::registry::{CandidateSelector, CompiledGroup, Registry, WildcardPrecedence};
use crate::domain::SubscriptionDescriptor;
use crate::ports::DescriptorProvider;

/// Registry plus the compiled wildcard sets derived from it.
#[derive(Debug)]
struct Snapshot {
    registry: Registry,
    compiled: DashMap<String, Arc<CompiledGroup>>,
}

impl Snapshot {
    fn new(registry: Registry) -> Arc<Self> {
        Arc::new(Self {
            registry,
            compiled: DashMap::new(),
        })
    }
}

#[derive(Debug)]
pub struct GroupCache {
    snapshot: RwLock<Arc<Snapshot>>,
    selector: CandidateSelector,
}

impl GroupCache {
    pub fn new(registry: Registry, precedence: WildcardPrecedence) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::new(registry)),
            selector: CandidateSelector::new(precedence),
        }
    }

    pub fn from_provider(provider: &dyn DescriptorProvider, precedence: WildcardPrecedence) -> Self {
        Self::new(Registry::from_provider(provider), precedence)
    }

    // Read lock is held only while cloning the Arc.
    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Candidates of `group` in registration order, or `None` for an unknown
    /// group.
    pub fn get_candidates(&self, group: &str) -> Option<Vec<Arc<SubscriptionDescriptor>>> {
        self.current().registry.candidates(group).map(<[_]>::to_vec)
    }

    /// Resolve `topic_key` within `group`.
    ///
    /// An unknown group returns `None` without compiling anything.
    pub fn try_resolve(&self, topic_key: &str, group: &str) -> Option<Arc<SubscriptionDescriptor>> {
        let snapshot = self.current();
        let candidates = snapshot.registry.candidates(group)?;

        if let Some(found) = self.selector.match_exact(topic_key, candidates) {
            return Some(found);
        }

        let compiled = Self::compiled_for(&snapshot, group, candidates);
        self.selector
            .match_wildcard(topic_key, &compiled)
            .map(|(_, descriptor)| descriptor)
    }

    /// Compiled wildcard set of `group`, building it on first use.
    pub fn compiled(&self, group: &str) -> Option<Arc<CompiledGroup>> {
        let snapshot = self.current();
        let candidates = snapshot.registry.candidates(group)?;
        Some(Self::compiled_for(&snapshot, group, candidates))
    }

    fn compiled_for(
        snapshot: &Snapshot,
        group: &str,
        candidates: &[Arc<SubscriptionDescriptor>],
    ) -> Arc<CompiledGroup> {
        if let Some(existing) = snapshot.compiled.get(group) {
            return Arc::clone(existing.value());
        }

        // Compile outside the shard lock; a concurrent builder may get there first.
        let built = Arc::new(CompiledGroup::build(candidates));
        let entry = snapshot
            .compiled
            .entry(group.to_string())
            .or_insert_with(|| {
                tracing::debug!(group, patterns = built.len(), "compiled wildcard patterns");
                Arc::clone(&built)
            });
        Arc::clone(entry.value())
    }

    /// Replace the registry with a fresh enumeration and drop every compiled
    /// set. Lookups already in flight finish against the previous snapshot.
    pub fn rebuild(&self, provider: &dyn DescriptorProvider) {
        let registry = Registry::from_provider(provider);
        let descriptors = registry.len();
        *self.snapshot.write() = Snapshot::new(registry);
        tracing::info!(descriptors, "group cache rebuilt");
    }

    pub fn groups(&self) -> Vec<String> {
        self.current().registry.groups()
    }

    /// Groups whose wildcard set has been compiled.
    pub fn compiled_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self
            .current()
            .compiled
            .iter()
            .map(|e| e.key().clone())
            .collect();
        groups.sort();
        groups
    }

    pub fn precedence(&self) -> WildcardPrecedence {
        self.selector.precedence()
    }
}
