//! Per-vertex computation of maximal nonzero path classes.
//!
//! A [`RepresentativeComputer`] explores the paths starting at one vertex,
//! grouping paths that the potential forces equal up to sign, and reports
//! one representative per maximal nonzero class. The analyzer is generic over
//! the computer so alternative exploration strategies can be plugged in.

pub mod frontier;

pub use frontier::MaximalNonzeroEquivalenceClassRepresentativeComputer;

use crate::core::{Quiver, Vertex};
use crate::path::Path;
use crate::rules::{RuleTreeError, TransformationRuleTree};
use crate::settings::{AnalysisSettings, CancellationToken};
use serde::Serialize;
use thiserror::Error;

/// Outcome of exploring the paths starting at one vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexComputation {
    /// Vertex the paths start at.
    pub start: Vertex,
    /// One representative per maximal nonzero class, sorted.
    pub maximal_representatives: Vec<Path>,
    /// A cancellativity failure was found (Cancellativity mode).
    pub cancellativity_failure_detected: bool,
    /// A cancellativity failure was found (WeakCancellativity mode).
    pub weak_cancellativity_failure_detected: bool,
    /// Nonzero paths longer than the configured maximum exist.
    pub max_path_length_exceeded: bool,
    /// The run stopped because the cancellation token was set.
    pub cancelled: bool,
    /// Longest nonzero path visited.
    pub longest_path: Path,
}

impl VertexComputation {
    /// An empty outcome for `start`.
    pub fn new(start: Vertex) -> Self {
        Self {
            start,
            maximal_representatives: Vec::new(),
            cancellativity_failure_detected: false,
            weak_cancellativity_failure_detected: false,
            max_path_length_exceeded: false,
            cancelled: false,
            longest_path: Path::stationary(start),
        }
    }

    /// Checks whether either cancellativity flag is set.
    #[inline]
    pub fn any_cancellativity_failure(&self) -> bool {
        self.cancellativity_failure_detected || self.weak_cancellativity_failure_detected
    }

    /// Checks whether the run explored every nonzero path.
    #[inline]
    pub fn is_complete(&self) -> bool {
        !self.max_path_length_exceeded && !self.cancelled
    }
}

/// Error type for per-vertex computations.
///
/// These indicate an inconsistency between the quiver and the rule tree,
/// never a property of the analyzed algebra.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    /// The start vertex is not part of the quiver or the rule tree.
    #[error("vertex {0} is not in the quiver")]
    UnknownVertex(Vertex),
    /// An adjacency list referenced a missing arrow.
    #[error("arrow index {0} is out of range")]
    UnknownArrowIndex(usize),
    /// The rule tree rejected a lookup.
    #[error(transparent)]
    RuleTree(#[from] RuleTreeError),
}

/// Computes maximal nonzero class representatives from one start vertex.
pub trait RepresentativeComputer: Send + Sync {
    /// Explores every nonzero path starting at `start`.
    ///
    /// `tree` must have been built for `quiver`; implementations reject any
    /// other tree with [`RuleTreeError::QuiverMismatch`]. The run checks
    /// `cancellation` before each new path length.
    fn compute_maximal_nonzero_equivalence_class_representatives_starting_at(
        &self,
        quiver: &Quiver,
        start: Vertex,
        tree: &TransformationRuleTree,
        settings: &AnalysisSettings,
        cancellation: &CancellationToken,
    ) -> Result<VertexComputation, ComputeError>;
}
