//! Rewrite rules derived from a potential.
//!
//! The creator turns the cyclic derivatives of a potential into rewrite rules
//! on paths; the tree compiles those rules into a deterministic finite-state
//! machine so the per-vertex computation can extend paths one arrow at a time
//! without ever re-deriving a relation.

pub mod creator;
pub mod tree;

pub use creator::{derive_relations, Relation, TransformationRuleTreeCreator};
pub use tree::{RuleAction, StateId, TransformationRule, TransformationRuleTree, Transition};

use crate::core::{Arrow, Vertex};
use thiserror::Error;

/// Error type for rule derivation and rule-tree lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleTreeError {
    /// The cyclic derivative for `arrow` has more than two distinct terms.
    #[error("arrow {arrow} lies on {terms} cycle positions; at most two are supported")]
    TooManyTerms {
        /// Arrow whose derivative is unsupported.
        arrow: Arrow,
        /// Number of distinct terms.
        terms: usize,
    },
    /// The two terms of the cyclic derivative for `arrow` differ in magnitude.
    #[error("arrow {arrow} has coefficients {first} and {second}; they must agree up to sign")]
    UnsupportedCoefficients {
        /// Arrow whose derivative is unsupported.
        arrow: Arrow,
        /// Coefficient of the first term.
        first: i64,
        /// Coefficient of the second term.
        second: i64,
    },
    /// A rule pattern references an arrow that the quiver lacks.
    #[error("rule references arrow {0} which is not in the quiver")]
    UnknownArrow(Arrow),
    /// A lookup used a state or arrow index outside the transition table.
    #[error("no transition from state {state} on arrow index {arrow_index}")]
    InvalidTransition {
        /// State of the lookup.
        state: u32,
        /// Arrow index of the lookup.
        arrow_index: usize,
    },
    /// A vertex is not part of the quiver the tree was built for.
    #[error("vertex {0} is not in the quiver")]
    UnknownVertex(Vertex),
    /// The tree was compiled for a different quiver.
    #[error("rule tree was built for a different quiver (first differing arrow index: {arrow_index:?})")]
    QuiverMismatch {
        /// First arrow index at which the quivers differ; `None` when the
        /// vertex sets already differ.
        arrow_index: Option<usize>,
    },
}
