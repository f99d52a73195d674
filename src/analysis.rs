//! Global self-injectivity analysis.
//!
//! [`QPAnalyzer`] derives (or fetches) the rule tree of a quiver with
//! potential, runs a [`RepresentativeComputer`] from every vertex and folds
//! the per-vertex outcomes into one [`AnalysisResults`] value.
//!
//! Negative findings (non-cancellativity, exceeded path length, early
//! termination) are flags of [`AnalysisMainResult`]; only internal
//! inconsistencies are errors.

use crate::cache::{CacheStats, RuleTreeCache};
use crate::compute::{
    ComputeError, MaximalNonzeroEquivalenceClassRepresentativeComputer, RepresentativeComputer,
    VertexComputation,
};
use crate::core::{Quiver, Vertex};
use crate::nakayama::NakayamaPermutation;
use crate::path::Path;
use crate::potential::QuiverWithPotential;
use crate::rules::{RuleTreeError, TransformationRuleTree, TransformationRuleTreeCreator};
use crate::settings::{AnalysisSettings, CancellationToken, CancellativityMode};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

/// Set of verdict flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct AnalysisMainResult(u8);

impl AnalysisMainResult {
    /// No pathology was found among the analyzed vertices.
    ///
    /// Set when every vertex was analyzed, and also when early termination
    /// on non-self-injectivity stopped the run after a completely analyzed
    /// vertex with several maximal classes. In the latter case `CANCELLED`
    /// marks the vertices that were skipped, if any.
    pub const SUCCESS: Self = Self(1);
    /// The Jacobian algebra is self-injective.
    pub const SELF_INJECTIVE: Self = Self(1 << 1);
    /// A cancellativity failure was found.
    pub const NOT_CANCELLATIVE: Self = Self(1 << 2);
    /// A weak-cancellativity failure was found.
    pub const NOT_WEAKLY_CANCELLATIVE: Self = Self(1 << 3);
    /// Some vertex exceeded the maximal path length.
    pub const ABORTED: Self = Self(1 << 4);
    /// Some vertices were skipped or interrupted by early termination.
    pub const CANCELLED: Self = Self(1 << 5);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::SUCCESS, "Success"),
        (Self::SELF_INJECTIVE, "SelfInjective"),
        (Self::NOT_CANCELLATIVE, "NotCancellative"),
        (Self::NOT_WEAKLY_CANCELLATIVE, "NotWeaklyCancellative"),
        (Self::ABORTED, "Aborted"),
        (Self::CANCELLED, "Cancelled"),
    ];

    /// No flag set.
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Checks whether every flag of `other` is set.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Checks whether no flag is set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AnalysisMainResult {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AnalysisMainResult {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Display for AnalysisMainResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Outcome of analyzing one quiver with potential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResults {
    /// Verdict flags.
    pub main_result: AnalysisMainResult,
    /// Maximal nonzero class representatives per analyzed vertex.
    pub maximal_representatives: BTreeMap<Vertex, Vec<Path>>,
    /// Present exactly when `main_result` contains `SELF_INJECTIVE`.
    pub nakayama_permutation: Option<NakayamaPermutation>,
    /// Longest nonzero path visited from any vertex.
    pub longest_path: Option<Path>,
}

impl AnalysisResults {
    /// Checks for `SUCCESS | SELF_INJECTIVE`.
    pub fn is_self_injective(&self) -> bool {
        self.main_result
            .contains(AnalysisMainResult::SUCCESS | AnalysisMainResult::SELF_INJECTIVE)
    }
}

/// Error type for the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The potential could not be turned into rewrite rules.
    #[error("rule derivation failed: {0}")]
    RuleTree(#[from] RuleTreeError),
    /// A per-vertex run hit an internal inconsistency.
    #[error("vertex computation failed: {0}")]
    Compute(#[from] ComputeError),
}

/// Per-vertex outcomes in vertex order; `None` for vertices skipped after
/// cancellation.
type VertexOutcomes = Vec<Option<VertexComputation>>;

/// Runs the self-injectivity analysis.
///
/// The computer is pluggable; rule trees are cached per QP fingerprint so
/// repeated analyses of the same QP (for example under different settings)
/// derive the rules once.
#[derive(Debug)]
pub struct QPAnalyzer<C = MaximalNonzeroEquivalenceClassRepresentativeComputer> {
    computer: C,
    creator: TransformationRuleTreeCreator,
    cache: Mutex<RuleTreeCache>,
}

impl QPAnalyzer {
    /// Analyzer with the default computer.
    pub fn new() -> Self {
        Self::with_computer(MaximalNonzeroEquivalenceClassRepresentativeComputer::new())
    }
}

impl Default for QPAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RepresentativeComputer> QPAnalyzer<C> {
    /// Analyzer with a custom computer.
    pub fn with_computer(computer: C) -> Self {
        Self {
            computer,
            creator: TransformationRuleTreeCreator::new(),
            cache: Mutex::new(RuleTreeCache::new()),
        }
    }

    /// The per-vertex computer.
    pub fn computer(&self) -> &C {
        &self.computer
    }

    /// Rule-tree cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Analyzes `qp` under `settings`.
    pub fn analyze(
        &self,
        qp: &QuiverWithPotential,
        settings: &AnalysisSettings,
    ) -> Result<AnalysisResults, AnalysisError> {
        let quiver = qp.quiver();
        let span = info_span!(
            "analyze",
            vertices = quiver.vertex_count(),
            arrows = quiver.arrow_count(),
            terms = qp.potential().len()
        );
        let _guard = span.enter();

        let tree = self.cache.lock().get_or_create(qp, &self.creator)?;
        let token = CancellationToken::new();
        let outcomes = self.run_vertices(quiver, &tree, settings, &token)?;

        let mut main_result = AnalysisMainResult::empty();
        let mut maximal_representatives = BTreeMap::new();
        let mut longest_path: Option<Path> = None;
        let mut complete = true;
        for (&vertex, outcome) in quiver.vertices().iter().zip(outcomes) {
            let Some(outcome) = outcome else {
                complete = false;
                continue;
            };
            main_result |= flags_of(&outcome);
            complete &= !outcome.cancelled;
            if longest_path
                .as_ref()
                .map_or(true, |longest| outcome.longest_path.len() > longest.len())
            {
                longest_path = Some(outcome.longest_path.clone());
            }
            maximal_representatives.insert(vertex, outcome.maximal_representatives);
        }

        if settings.cancellativity == CancellativityMode::Cancellativity
            && complete
            && main_result.is_empty()
        {
            main_result |= self.check_left_cancellation(qp, settings, &token)?;
        }

        // With no failure flag set, an incomplete run can only have been
        // stopped by a fully analyzed vertex with several maximal classes:
        // the verdict is already decided, whatever the vertex order.
        let mut nakayama_permutation = None;
        if main_result.is_empty() {
            main_result |= AnalysisMainResult::SUCCESS;
            if complete {
                nakayama_permutation = nakayama_of(&maximal_representatives);
            }
            if nakayama_permutation.is_some() {
                main_result |= AnalysisMainResult::SELF_INJECTIVE;
            }
        }
        if !complete {
            main_result |= AnalysisMainResult::CANCELLED;
        }

        info!(result = %main_result, "analysis finished");
        if let Some(sigma) = &nakayama_permutation {
            debug!(%sigma, "nakayama permutation");
        }
        Ok(AnalysisResults {
            main_result,
            maximal_representatives,
            nakayama_permutation,
            longest_path,
        })
    }

    /// Right cancellation of the opposite QP is left cancellation of `qp`.
    fn check_left_cancellation(
        &self,
        qp: &QuiverWithPotential,
        settings: &AnalysisSettings,
        token: &CancellationToken,
    ) -> Result<AnalysisMainResult, AnalysisError> {
        let opposite = qp.opposite();
        let tree = self.cache.lock().get_or_create(&opposite, &self.creator)?;
        let mut opposite_settings = *settings;
        opposite_settings.early_termination.on_non_self_injectivity = false;

        let mut flags = AnalysisMainResult::empty();
        let outcomes = self.run_vertices(opposite.quiver(), &tree, &opposite_settings, token)?;
        for outcome in outcomes {
            match outcome {
                Some(outcome) => {
                    if outcome.cancellativity_failure_detected {
                        flags |= AnalysisMainResult::NOT_CANCELLATIVE;
                    }
                    if outcome.max_path_length_exceeded {
                        flags |= AnalysisMainResult::ABORTED;
                    }
                    if outcome.cancelled {
                        flags |= AnalysisMainResult::CANCELLED;
                    }
                }
                None => flags |= AnalysisMainResult::CANCELLED,
            }
        }
        if flags.contains(AnalysisMainResult::NOT_CANCELLATIVE) {
            warn!("left cancellation fails");
        }
        Ok(flags)
    }

    fn run_vertices(
        &self,
        quiver: &Quiver,
        tree: &TransformationRuleTree,
        settings: &AnalysisSettings,
        token: &CancellationToken,
    ) -> Result<VertexOutcomes, ComputeError> {
        let run = |vertex: Vertex| -> Result<Option<VertexComputation>, ComputeError> {
            if token.is_cancelled() {
                return Ok(None);
            }
            let outcome = self
                .computer
                .compute_maximal_nonzero_equivalence_class_representatives_starting_at(
                    quiver, vertex, tree, settings, token,
                )?;
            if stops_early(&outcome, settings) {
                debug!(%vertex, "early termination");
                token.cancel();
            }
            Ok(Some(outcome))
        };

        if settings.parallel {
            quiver.vertices().par_iter().map(|&v| run(v)).collect()
        } else {
            quiver.vertices().iter().map(|&v| run(v)).collect()
        }
    }
}

fn flags_of(outcome: &VertexComputation) -> AnalysisMainResult {
    let mut flags = AnalysisMainResult::empty();
    if outcome.cancellativity_failure_detected {
        flags |= AnalysisMainResult::NOT_CANCELLATIVE;
    }
    if outcome.weak_cancellativity_failure_detected {
        flags |= AnalysisMainResult::NOT_CANCELLATIVE | AnalysisMainResult::NOT_WEAKLY_CANCELLATIVE;
    }
    if outcome.max_path_length_exceeded {
        flags |= AnalysisMainResult::ABORTED;
    }
    flags
}

fn stops_early(outcome: &VertexComputation, settings: &AnalysisSettings) -> bool {
    let condition = settings.early_termination;
    (condition.on_cancellativity_failure && outcome.any_cancellativity_failure())
        || (condition.on_non_admissibility && outcome.max_path_length_exceeded)
        || (condition.on_non_self_injectivity
            && outcome.is_complete()
            && outcome.maximal_representatives.len() != 1)
}

/// `v ↦ end(rep(v))` when every vertex has one maximal class and the map is
/// a bijection.
fn nakayama_of(representatives: &BTreeMap<Vertex, Vec<Path>>) -> Option<NakayamaPermutation> {
    let mut mapping = BTreeMap::new();
    for (&vertex, paths) in representatives {
        match paths.as_slice() {
            [only] => {
                mapping.insert(vertex, only.end());
            }
            _ => {
                debug!(%vertex, classes = paths.len(), "not self-injective");
                return None;
            }
        }
    }
    match NakayamaPermutation::new(mapping) {
        Ok(sigma) => Some(sigma),
        Err(err) => {
            debug!(%err, "socle map is not a permutation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_and_display() {
        let mut flags = AnalysisMainResult::SUCCESS | AnalysisMainResult::SELF_INJECTIVE;
        assert!(flags.contains(AnalysisMainResult::SUCCESS));
        assert!(!flags.contains(AnalysisMainResult::ABORTED));
        assert_eq!(flags.to_string(), "Success | SelfInjective");
        flags.insert(AnalysisMainResult::CANCELLED);
        assert_eq!(flags.bits(), 0b10_0011);
        assert_eq!(AnalysisMainResult::empty().to_string(), "None");
    }

    #[test]
    fn nakayama_requires_one_class_per_vertex() {
        let v = Vertex::new;
        let p = |vs: &[u32]| Path::through(vs).unwrap();
        let mut reps = BTreeMap::new();
        reps.insert(v(1), vec![p(&[1, 2])]);
        reps.insert(v(2), vec![p(&[2, 1])]);
        let sigma = nakayama_of(&reps).unwrap();
        assert_eq!(sigma.apply(v(1)), Some(v(2)));

        reps.insert(v(2), vec![p(&[2, 1]), p(&[2, 3])]);
        assert!(nakayama_of(&reps).is_none());

        reps.insert(v(2), vec![p(&[2, 3, 2])]);
        assert!(nakayama_of(&reps).is_none());
    }
}
