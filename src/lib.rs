//! Nakayama: self-injectivity analysis for quivers with potential.
//!
//! A quiver with potential (QP) defines a Jacobian algebra: the path algebra
//! of the quiver modulo the cyclic derivatives of the potential. This crate
//! decides whether that algebra is self-injective and, if so, computes its
//! Nakayama permutation. It provides:
//! - Quivers, paths, rotation-canonical cycles and potentials.
//! - Derivation of rewrite rules from the potential, compiled into a
//!   finite-state machine over arrows.
//! - A per-vertex engine that enumerates nonzero paths length by length,
//!   merging paths that are equal up to sign with a signed union-find, and
//!   detecting cancellativity failures.
//! - An analyzer that aggregates the per-vertex results into a verdict.
//!
//! # Mathematical Foundations
//!
//! A vertex `v` of a self-injective Jacobian algebra has a unique maximal
//! nonzero path class starting at `v`; its endpoint is `σ(v)`, the Nakayama
//! permutation. Cancellativity (no nonzero path equals its own negative and
//! `p·a = q·a` or `a·p = a·q` forces `p = q`) is what makes this
//! combinatorial test meaningful.
//!
//! # References
//!
//! - Derksen, Weyman, Zelevinsky. "Quivers with potentials and their representations I" (2008)
//! - Herschend, Iyama. "Selfinjective quivers with potential and 2-representation-finite algebras" (2011)
//! - Davison. "Consistency conditions for brane tilings" (2011) – cancellativity
//! - Skowroński, Yamagata. "Frobenius Algebras I" (2011) – Nakayama permutations
//!
//! # Example
//!
//! ```
//! use nakayama::prelude::*;
//!
//! let vertices = (1..=4).map(Vertex::new);
//! let arrows = (1..=4).map(|v| Arrow::new(Vertex::new(v), Vertex::new(v % 4 + 1)));
//! let quiver = Quiver::new(vertices, arrows)?;
//! let potential = Potential::from_terms([(Cycle::through(&[1u32, 2, 3, 4])?, 1)]);
//! let qp = QuiverWithPotential::new(quiver, potential)?;
//!
//! let results = QPAnalyzer::new().analyze(&qp, &AnalysisSettings::default())?;
//! assert!(results.is_self_injective());
//! let sigma = results.nakayama_permutation.unwrap();
//! assert_eq!(sigma.apply(Vertex::new(1)), Some(Vertex::new(3)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod arena;
pub mod cache;
pub mod compute;
pub mod core;
pub mod fingerprint;
pub mod nakayama;
pub mod path;
pub mod potential;
pub mod rules;
pub mod settings;

#[cfg(test)]
mod fixtures;

pub use crate::analysis::{AnalysisError, AnalysisMainResult, AnalysisResults, QPAnalyzer};
pub use crate::core::{Arrow, Quiver, QuiverError, Vertex};
pub use crate::nakayama::{NakayamaError, NakayamaPermutation};
pub use crate::path::{Cycle, Path, PathError};
pub use crate::potential::{Potential, PotentialError, QuiverWithPotential};
pub use crate::settings::{AnalysisSettings, CancellativityMode, EarlyTerminationCondition};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::analysis::{AnalysisError, AnalysisMainResult, AnalysisResults, QPAnalyzer};
    pub use crate::compute::{
        ComputeError, MaximalNonzeroEquivalenceClassRepresentativeComputer,
        RepresentativeComputer, VertexComputation,
    };
    pub use crate::core::{Arrow, Quiver, QuiverError, Vertex};
    pub use crate::fingerprint::{Canonicalizable, HashValue};
    pub use crate::nakayama::{NakayamaError, NakayamaPermutation};
    pub use crate::path::{Cycle, Path, PathError};
    pub use crate::potential::{Potential, PotentialError, QuiverWithPotential};
    pub use crate::rules::{
        RuleTreeError, TransformationRuleTree, TransformationRuleTreeCreator,
    };
    pub use crate::settings::{
        AnalysisSettings, CancellationToken, CancellativityMode, EarlyTerminationCondition,
        SettingsError,
    };
}
