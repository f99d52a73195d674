//! Nakayama permutations.
//!
//! For a self-injective Jacobian algebra the Nakayama permutation sends a
//! vertex `v` to the endpoint of the unique maximal nonzero path starting at
//! `v`: the socle of the projective at `v` is the simple at `σ(v)`.
//!
//! # Citations
//! - Skowroński, Yamagata, "Frobenius Algebras I", Chapter IV (2011)

use crate::core::Vertex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Error type for permutation construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NakayamaError {
    /// Two vertices map to the same image.
    #[error("vertices {first} and {second} both map to {image}")]
    NotInjective {
        /// First preimage.
        first: Vertex,
        /// Second preimage.
        second: Vertex,
        /// Shared image.
        image: Vertex,
    },
    /// An image is not in the domain.
    #[error("image {0} is not in the domain")]
    ImageOutsideDomain(Vertex),
}

/// An immutable bijection on a finite vertex set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NakayamaPermutation {
    mapping: BTreeMap<Vertex, Vertex>,
}

impl NakayamaPermutation {
    /// Wraps `mapping` after checking that it is a bijection of its domain.
    pub fn new(mapping: BTreeMap<Vertex, Vertex>) -> Result<Self, NakayamaError> {
        let mut preimages: BTreeMap<Vertex, Vertex> = BTreeMap::new();
        for (&source, &image) in &mapping {
            if !mapping.contains_key(&image) {
                return Err(NakayamaError::ImageOutsideDomain(image));
            }
            if let Some(&first) = preimages.get(&image) {
                return Err(NakayamaError::NotInjective {
                    first,
                    second: source,
                    image,
                });
            }
            preimages.insert(image, source);
        }
        Ok(Self { mapping })
    }

    /// The identity on `vertices`.
    pub fn identity<I: IntoIterator<Item = Vertex>>(vertices: I) -> Self {
        Self {
            mapping: vertices.into_iter().map(|v| (v, v)).collect(),
        }
    }

    /// Image of `vertex`, if it is in the domain.
    #[inline]
    pub fn apply(&self, vertex: Vertex) -> Option<Vertex> {
        self.mapping.get(&vertex).copied()
    }

    /// The inverse permutation.
    pub fn inverse(&self) -> Self {
        Self {
            mapping: self.mapping.iter().map(|(&s, &t)| (t, s)).collect(),
        }
    }

    /// Disjoint cycles, each starting at its smallest vertex, in vertex order.
    ///
    /// Fixed points are included as one-element cycles.
    pub fn cycles(&self) -> Vec<Vec<Vertex>> {
        let mut seen = BTreeSet::new();
        let mut cycles = Vec::new();
        for &start in self.mapping.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut cycle = vec![start];
            let mut current = start;
            while let Some(next) = self.apply(current) {
                if next == start || !seen.insert(next) {
                    break;
                }
                cycle.push(next);
                current = next;
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// Order in the symmetric group: the lcm of the cycle lengths.
    pub fn order(&self) -> usize {
        fn gcd(a: usize, b: usize) -> usize {
            if b == 0 {
                a
            } else {
                gcd(b, a % b)
            }
        }
        self.cycles()
            .iter()
            .map(Vec::len)
            .fold(1, |acc, len| acc / gcd(acc, len) * len)
    }

    /// Checks whether every vertex is fixed.
    pub fn is_identity(&self) -> bool {
        self.mapping.iter().all(|(s, t)| s == t)
    }

    /// Iterates over `(vertex, image)` in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.mapping.iter().map(|(&s, &t)| (s, t))
    }

    /// Number of vertices in the domain.
    #[inline]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Checks whether the domain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// The underlying mapping.
    #[inline]
    pub fn as_map(&self) -> &BTreeMap<Vertex, Vertex> {
        &self.mapping
    }
}

impl fmt::Display for NakayamaPermutation {
    /// Cycle notation, e.g. `(1 3 2)(4)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cycle in self.cycles() {
            write!(f, "(")?;
            for (i, vertex) in cycle.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{vertex}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
