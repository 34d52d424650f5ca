//! Pattern - トピックパターンのマッチング
//!
//! パターン構文:
//! - リテラルはそのまま一致。`.` はセグメント区切りで、リテラルとして一致する
//! - `*` は `[0-9a-zA-Z_]+` からなるちょうど 1 セグメントに一致
//! - `#` は `[0-9a-zA-Z_.]` の 1 文字以上に一致し、セグメント区切りをまたぐ
//!
//! コンパイル済みパターンは両端でアンカーされ、部分文字列ではなく
//! トピックキー全体に一致します。

use std::sync::Arc;

use regex::Regex;

use crate::domain::{RegistrationError, SubscriptionDescriptor};

pub const SINGLE_WILDCARD: char = '*';
pub const MULTI_WILDCARD: char = '#';

const SEGMENT_CLASS: &str = "[0-9a-zA-Z_]+";
const MULTI_SEGMENT_CLASS: &str = "[0-9a-zA-Z_.]+";

/// Resolution tier a pattern takes part in. Tiers are tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTier {
    Exact,
    SingleSegment,
    MultiSegment,
}

/// A pattern compiled into an anchored regex.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    tier: PatternTier,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile for the `*` tier. `#` stays a literal character here.
    pub fn single_segment(pattern: &str) -> Result<Self, RegistrationError> {
        Self::compile(pattern, PatternTier::SingleSegment)
    }

    /// Compile for the `#` tier. A `*` in the same pattern keeps its
    /// one-segment meaning.
    pub fn multi_segment(pattern: &str) -> Result<Self, RegistrationError> {
        Self::compile(pattern, PatternTier::MultiSegment)
    }

    fn compile(pattern: &str, tier: PatternTier) -> Result<Self, RegistrationError> {
        if pattern.is_empty() {
            return Err(RegistrationError::EmptyPattern);
        }
        let expand_multi = tier == PatternTier::MultiSegment;
        let source = translate(pattern, expand_multi);
        let regex = Regex::new(&source).map_err(|e| RegistrationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source,
            tier,
            regex,
        })
    }

    pub fn is_match(&self, topic_key: &str) -> bool {
        self.regex.is_match(topic_key)
    }

    pub fn tier(&self) -> PatternTier {
        self.tier
    }

    /// The generated regex source (for logs and tests).
    pub fn as_regex_str(&self) -> &str {
        &self.source
    }
}

/// Build the anchored regex source for `pattern`.
fn translate(pattern: &str, expand_multi: bool) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut literal = String::new();
    out.push('^');
    for c in pattern.chars() {
        let class = match c {
            SINGLE_WILDCARD => Some(SEGMENT_CLASS),
            MULTI_WILDCARD if expand_multi => Some(MULTI_SEGMENT_CLASS),
            _ => None,
        };
        match class {
            Some(class) => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(class);
            }
            None => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Validate that `pattern` compiles for every tier it takes part in.
pub fn validate(pattern: &str) -> Result<(), RegistrationError> {
    if pattern.is_empty() {
        return Err(RegistrationError::EmptyPattern);
    }
    if pattern.contains(SINGLE_WILDCARD) {
        CompiledPattern::single_segment(pattern)?;
    }
    if pattern.contains(MULTI_WILDCARD) {
        CompiledPattern::multi_segment(pattern)?;
    }
    Ok(())
}

/// Number of wildcards and literal characters, used by specificity ordering.
pub fn specificity(pattern: &str) -> (usize, usize) {
    let wildcards = pattern
        .chars()
        .filter(|c| *c == SINGLE_WILDCARD || *c == MULTI_WILDCARD)
        .count();
    (wildcards, pattern.chars().count() - wildcards)
}

/// A descriptor paired with its compiled matching form.
#[derive(Debug, Clone)]
pub struct CompiledPatternEntry {
    pub descriptor: Arc<SubscriptionDescriptor>,
    pub pattern: CompiledPattern,
}

impl CompiledPatternEntry {
    pub fn is_match(&self, topic_key: &str) -> bool {
        self.pattern.is_match(topic_key)
    }
}
