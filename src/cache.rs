//! Memoization of rule trees.
//!
//! Deriving the rule tree of a quiver with potential is independent of the
//! analysis settings, so an analyzer keeps every tree it builds, keyed by the
//! QP fingerprint, and reuses it for repeated analyses.
//!
//! # References
//! - *Cache invalidation*: [Two Hard Things in Computer Science, Phil Karlton]

use crate::fingerprint::HashValue;
use crate::potential::QuiverWithPotential;
use crate::rules::{RuleTreeError, TransformationRuleTree, TransformationRuleTreeCreator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Hit and miss counters of a [`RuleTreeCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that derived a new tree.
    pub misses: u64,
}

/// Rule trees keyed by QP fingerprint.
#[derive(Debug, Default)]
pub struct RuleTreeCache {
    trees: HashMap<HashValue, Arc<TransformationRuleTree>>,
    stats: CacheStats,
}

impl RuleTreeCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a cached tree by fingerprint.
    pub fn get(&self, key: &HashValue) -> Option<Arc<TransformationRuleTree>> {
        self.trees.get(key).cloned()
    }

    /// Returns the tree of `qp`, deriving and storing it on a miss.
    pub fn get_or_create(
        &mut self,
        qp: &QuiverWithPotential,
        creator: &TransformationRuleTreeCreator,
    ) -> Result<Arc<TransformationRuleTree>, RuleTreeError> {
        let key = qp.qp_fingerprint();
        if let Some(tree) = self.trees.get(&key) {
            self.stats.hits += 1;
            trace!(%key, "rule tree cache hit");
            return Ok(Arc::clone(tree));
        }
        self.stats.misses += 1;
        trace!(%key, "rule tree cache miss");
        let tree = Arc::new(creator.create(qp)?);
        self.trees.insert(key, Arc::clone(&tree));
        Ok(tree)
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Checks whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Hit and miss counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Clears all cached trees (coarse invalidation).
    pub fn clear(&mut self) {
        self.trees.clear();
    }
}
