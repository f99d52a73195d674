//! Derivation of rewrite rules from the cyclic derivatives of a potential.
//!
//! For an arrow `a`, the cyclic derivative ∂ₐW collects, for every
//! occurrence of `a` in a cycle of `W`, the rest of that cycle read from the
//! head of `a` back to its tail. Each derivative is one relation of the
//! Jacobian algebra.
//!
//! # Citations
//! - Derksen, Weyman, Zelevinsky, "Quivers with potentials and their
//!   representations I: Mutations", Selecta Math. (2008), §3

use super::tree::{TransformationRule, TransformationRuleTree};
use super::RuleTreeError;
use crate::arena::Sign;
use crate::path::Path;
use crate::potential::QuiverWithPotential;
use std::collections::BTreeMap;
use tracing::debug;

/// A relation read off a single cyclic derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// The path is zero.
    Zero(Path),
    /// `left = sign · right`, both of the same length.
    Commutativity {
        /// Smaller of the two paths.
        left: Path,
        /// Larger of the two paths.
        right: Path,
        /// Multiplier relating them.
        sign: Sign,
    },
    /// Two parallel paths of different lengths are equal up to sign; any
    /// continuation of the shorter one is zero.
    ShorterDies {
        /// Shorter remainder.
        shorter: Path,
        /// Longer remainder.
        longer: Path,
    },
}

/// Computes one relation per arrow whose cyclic derivative is nonzero.
///
/// Arrows are visited in insertion order.
pub fn derive_relations(qp: &QuiverWithPotential) -> Result<Vec<Relation>, RuleTreeError> {
    let mut relations = Vec::new();
    for arrow in qp.quiver().arrows() {
        let mut derivative: BTreeMap<Path, i64> = BTreeMap::new();
        for (cycle, coefficient) in qp.potential().terms() {
            for remainder in cycle.remainders_after(arrow) {
                *derivative.entry(remainder).or_insert(0) += coefficient;
            }
        }
        derivative.retain(|_, c| *c != 0);

        let mut terms = derivative.into_iter();
        let relation = match (terms.next(), terms.next(), terms.len()) {
            (None, _, _) => continue,
            (Some((path, _)), None, _) => Relation::Zero(path),
            (Some((p1, c1)), Some((p2, c2)), 0) => {
                if c1.abs() != c2.abs() {
                    return Err(RuleTreeError::UnsupportedCoefficients {
                        arrow: *arrow,
                        first: c1,
                        second: c2,
                    });
                }
                // c1·p1 + c2·p2 = 0
                let sign = if c1 == c2 { Sign::Negative } else { Sign::Positive };
                match p1.len().cmp(&p2.len()) {
                    std::cmp::Ordering::Equal => Relation::Commutativity {
                        left: p1,
                        right: p2,
                        sign,
                    },
                    std::cmp::Ordering::Less => Relation::ShorterDies {
                        shorter: p1,
                        longer: p2,
                    },
                    std::cmp::Ordering::Greater => Relation::ShorterDies {
                        shorter: p2,
                        longer: p1,
                    },
                }
            }
            (Some(_), Some(_), rest) => {
                return Err(RuleTreeError::TooManyTerms {
                    arrow: *arrow,
                    terms: rest + 2,
                })
            }
        };
        relations.push(relation);
    }
    Ok(relations)
}

/// Builds the [`TransformationRuleTree`] of a quiver with potential.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformationRuleTreeCreator;

impl TransformationRuleTreeCreator {
    /// Creates a new creator.
    pub fn new() -> Self {
        Self
    }

    /// Derives the relations of `qp` and compiles them into an automaton.
    pub fn create(&self, qp: &QuiverWithPotential) -> Result<TransformationRuleTree, RuleTreeError> {
        let quiver = qp.quiver();
        let relations = derive_relations(qp)?;
        let mut rules = Vec::with_capacity(relations.len() * 2);
        for relation in relations {
            match relation {
                Relation::Zero(path) => rules.push(TransformationRule::dies(path)),
                Relation::Commutativity { left, right, sign } => {
                    rules.push(TransformationRule::replace(left.clone(), right.clone(), sign));
                    rules.push(TransformationRule::replace(right, left, sign));
                }
                Relation::ShorterDies { shorter, .. } => {
                    for arrow in quiver.outgoing(shorter.end()) {
                        rules.push(TransformationRule::dies(shorter.extended_unchecked(arrow)));
                    }
                }
            }
        }
        let tree = TransformationRuleTree::build(quiver, rules)?;
        debug!(
            rules = tree.rules().len(),
            states = tree.state_count(),
            "built transformation rule tree"
        );
        Ok(tree)
    }
}
