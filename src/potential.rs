//! Potentials and quivers with potential.
//!
//! A potential is a finite Z-linear combination of cycles. Cycles are stored
//! canonically, so adding a rotation of an existing cycle combines with it.
//!
//! # Invariants
//! - No stored coefficient is zero; every operation drops cancelled terms.
//!
//! # Citations
//! - Derksen, Weyman, Zelevinsky, "Quivers with potentials and their
//!   representations I: Mutations", Selecta Math. (2008)

use crate::core::{Arrow, Quiver};
use crate::path::Cycle;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg};
use thiserror::Error;

/// A finite formal combination of cycles with nonzero integer coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Potential {
    terms: BTreeMap<Cycle, i64>,
}

impl Potential {
    /// Creates the zero potential.
    #[inline]
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// Creates a potential from `(cycle, coefficient)` pairs.
    ///
    /// Repeated cycles are combined; zero results are dropped.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = (Cycle, i64)>,
    {
        let mut potential = Self::new();
        for (cycle, coefficient) in terms {
            potential.add_cycle(cycle, coefficient);
        }
        potential
    }

    /// Adds `coefficient · cycle` in place.
    pub fn add_cycle(&mut self, cycle: Cycle, coefficient: i64) {
        if coefficient == 0 {
            return;
        }
        match self.terms.entry(cycle) {
            Entry::Vacant(slot) => {
                slot.insert(coefficient);
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += coefficient;
                if *slot.get() == 0 {
                    slot.remove();
                }
            }
        }
    }

    /// Returns the coefficient of `cycle` (zero if absent).
    pub fn coefficient(&self, cycle: &Cycle) -> i64 {
        self.terms.get(cycle).copied().unwrap_or(0)
    }

    /// Iterates over `(cycle, coefficient)` in canonical cycle order.
    pub fn terms(&self) -> impl Iterator<Item = (&Cycle, i64)> {
        self.terms.iter().map(|(cycle, &c)| (cycle, c))
    }

    /// Returns the number of cycles with nonzero coefficient.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Checks whether this is the zero potential.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns `k · self`.
    pub fn scale(&self, k: i64) -> Self {
        if k == 0 {
            return Self::new();
        }
        Self {
            terms: self.terms.iter().map(|(cycle, &c)| (cycle.clone(), c * k)).collect(),
        }
    }

    /// Returns the potential with every cycle reversed (for the opposite quiver).
    pub fn opposite(&self) -> Self {
        Self::from_terms(self.terms.iter().map(|(cycle, &c)| (cycle.reversed(), c)))
    }
}

impl From<BTreeMap<Cycle, i64>> for Potential {
    fn from(map: BTreeMap<Cycle, i64>) -> Self {
        Self::from_terms(map)
    }
}

impl<'a> Add<&'a Potential> for &'a Potential {
    type Output = Potential;

    fn add(self, rhs: &'a Potential) -> Potential {
        let mut sum = self.clone();
        for (cycle, c) in rhs.terms() {
            sum.add_cycle(cycle.clone(), c);
        }
        sum
    }
}

impl Add for Potential {
    type Output = Potential;

    fn add(self, rhs: Potential) -> Potential {
        &self + &rhs
    }
}

impl Mul<i64> for &Potential {
    type Output = Potential;

    fn mul(self, k: i64) -> Potential {
        self.scale(k)
    }
}

impl Neg for &Potential {
    type Output = Potential;

    fn neg(self) -> Potential {
        self.scale(-1)
    }
}

/// Error type for quiver-with-potential construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PotentialError {
    /// A cycle of the potential uses an arrow that the quiver lacks.
    #[error("cycle {cycle} uses arrow {arrow} which is not in the quiver")]
    ArrowNotInQuiver {
        /// Offending cycle.
        cycle: Cycle,
        /// Missing arrow.
        arrow: Arrow,
    },
}

/// A quiver together with a potential on it.
///
/// # Invariant
/// - Every arrow of every cycle in the potential is an arrow of the quiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuiverWithPotential {
    quiver: Quiver,
    potential: Potential,
}

impl QuiverWithPotential {
    /// Attaches `potential` to `quiver`, validating the invariant.
    pub fn new(quiver: Quiver, potential: Potential) -> Result<Self, PotentialError> {
        for (cycle, _) in potential.terms() {
            if let Some(&arrow) = cycle.arrows().iter().find(|a| !quiver.contains_arrow(a)) {
                return Err(PotentialError::ArrowNotInQuiver {
                    cycle: cycle.clone(),
                    arrow,
                });
            }
        }
        Ok(Self { quiver, potential })
    }

    /// Returns the underlying quiver.
    #[inline]
    pub fn quiver(&self) -> &Quiver {
        &self.quiver
    }

    /// Returns the potential.
    #[inline]
    pub fn potential(&self) -> &Potential {
        &self.potential
    }

    /// Returns the opposite quiver with the reversed potential.
    ///
    /// Its Jacobian algebra is the opposite algebra, so right-sided
    /// properties of the opposite are left-sided properties of `self`.
    pub fn opposite(&self) -> Self {
        Self {
            quiver: self.quiver.opposite(),
            potential: self.potential.opposite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vertex;
    use proptest::prelude::*;

    fn arrow(source: u32, target: u32) -> Arrow {
        Arrow::new(Vertex::new(source), Vertex::new(target))
    }

    fn cycle(vertices: &[u32]) -> Cycle {
        Cycle::through(vertices).unwrap()
    }

    #[test]
    fn zero_coefficients_are_dropped() {
        let mut map = BTreeMap::new();
        map.insert(cycle(&[1, 2, 3]), 0);
        map.insert(cycle(&[1, 3, 2]), -1);
        let potential = Potential::from(map);
        assert_eq!(potential.len(), 1);
        assert_eq!(potential.coefficient(&cycle(&[1, 2, 3])), 0);
        assert_eq!(potential.coefficient(&cycle(&[2, 1, 3])), -1);
    }

    #[test]
    fn rotations_combine() {
        let mut potential = Potential::new();
        potential.add_cycle(cycle(&[1, 2, 3]), 2);
        potential.add_cycle(cycle(&[3, 1, 2]), -2);
        assert!(potential.is_empty());
    }

    #[test]
    fn rejects_cycles_outside_quiver() {
        let quiver = Quiver::new(
            [Vertex::new(1), Vertex::new(2)],
            [arrow(1, 2)],
        )
        .unwrap();
        let potential = Potential::from_terms([(cycle(&[1, 2]), 1)]);
        assert_eq!(
            QuiverWithPotential::new(quiver, potential),
            Err(PotentialError::ArrowNotInQuiver {
                cycle: cycle(&[1, 2]),
                arrow: arrow(2, 1)
            })
        );
    }

    #[test]
    fn opposite_round_trips() {
        let quiver = Quiver::new(
            (1..=3).map(Vertex::new),
            [arrow(1, 2), arrow(2, 3), arrow(3, 1)],
        )
        .unwrap();
        let qp = QuiverWithPotential::new(quiver, Potential::from_terms([(cycle(&[1, 2, 3]), 1)]))
            .unwrap();
        let op = qp.opposite();
        assert_eq!(op.potential().coefficient(&cycle(&[3, 2, 1])), 1);
        assert_eq!(op.opposite(), qp);
    }

    fn arb_potential() -> impl Strategy<Value = Potential> {
        let cycles = vec![
            cycle(&[1, 2, 3]),
            cycle(&[1, 3, 2]),
            cycle(&[1, 2, 3, 4]),
            cycle(&[2, 4, 3]),
            cycle(&[1, 2]),
        ];
        prop::collection::vec((0..cycles.len(), -3i64..=3), 0..8).prop_map(move |picks| {
            Potential::from_terms(picks.into_iter().map(|(i, c)| (cycles[i].clone(), c)))
        })
    }

    proptest! {
        #[test]
        fn prop_no_zero_entries(p in arb_potential(), q in arb_potential(), k in -3i64..=3) {
            for r in [&p + &q, p.scale(k), &p + &(-&p)] {
                prop_assert!(r.terms().all(|(_, c)| c != 0));
            }
            prop_assert!((&p + &(-&p)).is_empty());
        }

        #[test]
        fn prop_add_commutative_associative(
            p in arb_potential(),
            q in arb_potential(),
            r in arb_potential(),
        ) {
            prop_assert_eq!(&p + &q, &q + &p);
            prop_assert_eq!(&(&p + &q) + &r, &p + &(&q + &r));
        }

        #[test]
        fn prop_scale_distributes(
            p in arb_potential(),
            q in arb_potential(),
            a in -3i64..=3,
            b in -3i64..=3,
        ) {
            prop_assert_eq!((&p + &q).scale(a), &p.scale(a) + &q.scale(a));
            prop_assert_eq!(p.scale(a + b), &p.scale(a) + &p.scale(b));
            prop_assert_eq!(p.scale(a).scale(b), &p * (a * b));
        }
    }
}
