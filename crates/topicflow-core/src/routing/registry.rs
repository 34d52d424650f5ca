//! Registry - グループ別の購読 descriptor と最適候補の選択
//!
//! `DescriptorProvider` から一度だけ構築し、以降は不変なので読み取りに
//! 同期は不要です。

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::pattern::{CompiledPattern, CompiledPatternEntry, PatternTier, specificity};
use crate::domain::SubscriptionDescriptor;
use crate::ports::DescriptorProvider;

/// How to pick among several wildcard candidates matching the same key
/// within one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardPrecedence {
    /// First match in registration order.
    #[default]
    RegistrationOrder,

    /// Fewest wildcards, then most literal characters, then registration
    /// order.
    MostSpecific,
}

/// Immutable group -> ordered descriptors index.
#[derive(Debug, Default)]
pub struct Registry {
    by_group: HashMap<String, Vec<Arc<SubscriptionDescriptor>>>,
    len: usize,
}

impl Registry {
    /// Group `descriptors`, keeping registration order within each group.
    pub fn new(descriptors: Vec<SubscriptionDescriptor>) -> Self {
        let len = descriptors.len();
        let mut by_group: HashMap<String, Vec<Arc<SubscriptionDescriptor>>> = HashMap::new();
        for descriptor in descriptors {
            by_group
                .entry(descriptor.group().to_string())
                .or_default()
                .push(Arc::new(descriptor));
        }
        Self { by_group, len }
    }

    pub fn from_provider(provider: &dyn DescriptorProvider) -> Self {
        Self::new(provider.enumerate())
    }

    /// Candidates of `group` in registration order, or `None` for an unknown
    /// group.
    pub fn candidates(&self, group: &str) -> Option<&[Arc<SubscriptionDescriptor>]> {
        self.by_group.get(group).map(Vec::as_slice)
    }

    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.by_group.keys().cloned().collect();
        groups.sort();
        groups
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Wildcard candidates of one group, compiled.
#[derive(Debug, Default)]
pub struct CompiledGroup {
    pub single: Vec<CompiledPatternEntry>,
    pub multi: Vec<CompiledPatternEntry>,
}

impl CompiledGroup {
    /// Compile every wildcard candidate, keeping registration order.
    ///
    /// A pattern containing both wildcards takes part in both tiers.
    /// Patterns are validated at registration; one that still fails to
    /// compile here is logged and left out.
    pub fn build(candidates: &[Arc<SubscriptionDescriptor>]) -> Self {
        let mut group = CompiledGroup::default();
        for descriptor in candidates {
            if descriptor.has_single_wildcard() {
                match CompiledPattern::single_segment(descriptor.pattern()) {
                    Ok(pattern) => group.single.push(CompiledPatternEntry {
                        descriptor: Arc::clone(descriptor),
                        pattern,
                    }),
                    Err(err) => tracing::warn!(error = %err, "skipping uncompilable pattern"),
                }
            }
            if descriptor.has_multi_wildcard() {
                match CompiledPattern::multi_segment(descriptor.pattern()) {
                    Ok(pattern) => group.multi.push(CompiledPatternEntry {
                        descriptor: Arc::clone(descriptor),
                        pattern,
                    }),
                    Err(err) => tracing::warn!(error = %err, "skipping uncompilable pattern"),
                }
            }
        }
        group
    }

    pub fn len(&self) -> usize {
        self.single.len() + self.multi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Picks the descriptor that handles a topic key.
///
/// Tiers are tried in order (exact, `*`, `#`); the first tier with a match
/// decides, later tiers are not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateSelector {
    precedence: WildcardPrecedence,
}

impl CandidateSelector {
    pub fn new(precedence: WildcardPrecedence) -> Self {
        Self { precedence }
    }

    pub fn precedence(&self) -> WildcardPrecedence {
        self.precedence
    }

    /// Exact tier: pattern equal to the key, case-sensitive.
    pub fn match_exact(
        &self,
        topic_key: &str,
        candidates: &[Arc<SubscriptionDescriptor>],
    ) -> Option<Arc<SubscriptionDescriptor>> {
        candidates
            .iter()
            .find(|d| d.pattern() == topic_key)
            .cloned()
    }

    /// Wildcard tiers over an already compiled group.
    pub fn match_wildcard(
        &self,
        topic_key: &str,
        compiled: &CompiledGroup,
    ) -> Option<(PatternTier, Arc<SubscriptionDescriptor>)> {
        if let Some(d) = self.pick(topic_key, &compiled.single) {
            return Some((PatternTier::SingleSegment, d));
        }
        self.pick(topic_key, &compiled.multi)
            .map(|d| (PatternTier::MultiSegment, d))
    }

    /// Full resolution over one group's candidates.
    pub fn select_best_candidate(
        &self,
        topic_key: &str,
        candidates: &[Arc<SubscriptionDescriptor>],
        compiled: &CompiledGroup,
    ) -> Option<Arc<SubscriptionDescriptor>> {
        self.match_exact(topic_key, candidates)
            .or_else(|| self.match_wildcard(topic_key, compiled).map(|(_, d)| d))
    }

    fn pick(
        &self,
        topic_key: &str,
        entries: &[CompiledPatternEntry],
    ) -> Option<Arc<SubscriptionDescriptor>> {
        let mut matching = entries.iter().filter(|e| e.is_match(topic_key));
        let chosen = match self.precedence {
            WildcardPrecedence::RegistrationOrder => matching.next(),
            WildcardPrecedence::MostSpecific => matching.min_by_key(|e| {
                let (wildcards, literals) = specificity(e.descriptor.pattern());
                (wildcards, Reverse(literals))
            }),
        };
        chosen.map(|e| Arc::clone(&e.descriptor))
    }
}
