//! Paths and cycles in a quiver.
//!
//! A [`Path`] is a starting vertex together with a composable arrow sequence;
//! the stationary path at a vertex has no arrows. A [`Cycle`] is a closed path
//! stored in canonical rotation so that structurally identical cycles compare
//! equal regardless of the vertex they were written from.
//!
//! # Determinism
//! - Paths are ordered by start vertex, then lexicographically by arrows.
//! - The canonical rotation of a cycle is the lexicographically smallest one.

use crate::core::{Arrow, Vertex};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for malformed paths and cycles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The first arrow does not start at the declared start vertex.
    #[error("arrow {arrow} does not start at path start {start}")]
    StartMismatch {
        /// Declared start vertex.
        start: Vertex,
        /// First arrow.
        arrow: Arrow,
    },
    /// Two consecutive arrows are not composable.
    #[error("arrow {next} at position {index} does not continue from {previous}")]
    NotComposable {
        /// Position of `next` in the arrow sequence.
        index: usize,
        /// Arrow before `next`.
        previous: Arrow,
        /// Arrow that fails to compose.
        next: Arrow,
    },
    /// A cycle must end where it starts.
    #[error("path from {start} to {end} is not closed")]
    NotClosed {
        /// Start vertex.
        start: Vertex,
        /// End vertex.
        end: Vertex,
    },
    /// Concatenated paths do not meet.
    #[error("path ending at {end} cannot be followed by a path starting at {start}")]
    EndpointMismatch {
        /// End of the first path.
        end: Vertex,
        /// Start of the second path.
        start: Vertex,
    },
    /// A cycle needs at least one arrow.
    #[error("a cycle needs at least one arrow")]
    EmptyCycle,
}

/// A path in a quiver: a start vertex followed by composable arrows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    start: Vertex,
    arrows: Vec<Arrow>,
}

impl Path {
    /// Creates the stationary (length 0) path at `vertex`.
    #[inline]
    pub fn stationary(vertex: Vertex) -> Self {
        Self {
            start: vertex,
            arrows: Vec::new(),
        }
    }

    /// Creates a path, checking that the arrows compose.
    pub fn new(start: Vertex, arrows: Vec<Arrow>) -> Result<Self, PathError> {
        if let Some(&first) = arrows.first() {
            if first.source != start {
                return Err(PathError::StartMismatch { start, arrow: first });
            }
        }
        for (index, pair) in arrows.windows(2).enumerate() {
            if pair[0].target != pair[1].source {
                return Err(PathError::NotComposable {
                    index: index + 1,
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(Self { start, arrows })
    }

    /// Creates the path visiting `vertices` in order.
    ///
    /// A single vertex yields the stationary path. Returns `None` for an
    /// empty slice.
    pub fn through<V: Copy + Into<Vertex>>(vertices: &[V]) -> Option<Self> {
        let (&first, _) = vertices.split_first()?;
        let arrows = vertices
            .windows(2)
            .map(|pair| Arrow::new(pair[0].into(), pair[1].into()))
            .collect();
        Some(Self {
            start: first.into(),
            arrows,
        })
    }

    /// Builds a path from a sequence already known to compose.
    pub(crate) fn from_parts_unchecked(start: Vertex, arrows: Vec<Arrow>) -> Self {
        debug_assert!(Self::new(start, arrows.clone()).is_ok());
        Self { start, arrows }
    }

    /// Returns the start vertex.
    #[inline]
    pub fn start(&self) -> Vertex {
        self.start
    }

    /// Returns the end vertex.
    #[inline]
    pub fn end(&self) -> Vertex {
        self.arrows.last().map_or(self.start, |a| a.target)
    }

    /// Returns the arrows of the path.
    #[inline]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Returns the number of arrows.
    #[inline]
    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    /// Checks whether the path is stationary.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    /// Checks whether the path ends where it starts.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.start == self.end()
    }

    /// Iterates over the visited vertices, start included.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        std::iter::once(self.start).chain(self.arrows.iter().map(|a| a.target))
    }

    /// Returns `self` followed by `arrow`.
    pub fn extended(&self, arrow: Arrow) -> Result<Self, PathError> {
        if arrow.source != self.end() {
            return Err(match self.arrows.last() {
                Some(&previous) => PathError::NotComposable {
                    index: self.arrows.len(),
                    previous,
                    next: arrow,
                },
                None => PathError::StartMismatch {
                    start: self.start,
                    arrow,
                },
            });
        }
        Ok(self.extended_unchecked(arrow))
    }

    pub(crate) fn extended_unchecked(&self, arrow: Arrow) -> Self {
        let mut arrows = Vec::with_capacity(self.arrows.len() + 1);
        arrows.extend_from_slice(&self.arrows);
        arrows.push(arrow);
        Self {
            start: self.start,
            arrows,
        }
    }

    /// Returns the concatenation `self · other`.
    pub fn concat(&self, other: &Path) -> Result<Self, PathError> {
        if other.start != self.end() {
            return Err(PathError::EndpointMismatch {
                end: self.end(),
                start: other.start,
            });
        }
        let mut arrows = self.arrows.clone();
        arrows.extend_from_slice(&other.arrows);
        Ok(Self {
            start: self.start,
            arrows,
        })
    }

    /// Replaces the last `suffix_len` arrows with `replacement`.
    ///
    /// The caller guarantees that the replaced suffix and `replacement` are
    /// parallel (same endpoints).
    pub(crate) fn with_suffix_replaced(&self, suffix_len: usize, replacement: &[Arrow]) -> Self {
        debug_assert!(suffix_len <= self.arrows.len());
        let keep = self.arrows.len() - suffix_len;
        let mut arrows = Vec::with_capacity(keep + replacement.len());
        arrows.extend_from_slice(&self.arrows[..keep]);
        arrows.extend_from_slice(replacement);
        Self {
            start: self.start,
            arrows,
        }
    }

    /// Returns the same path in the opposite quiver.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end(),
            arrows: self.arrows.iter().rev().map(Arrow::reversed).collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for arrow in &self.arrows {
            write!(f, "->{}", arrow.target)?;
        }
        Ok(())
    }
}

/// A closed path in canonical rotation.
///
/// Two cycles are equal iff one is a rotation of the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(Path);

impl Cycle {
    /// Canonicalizes a closed, nonempty path.
    pub fn new(path: Path) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::EmptyCycle);
        }
        if !path.is_closed() {
            return Err(PathError::NotClosed {
                start: path.start(),
                end: path.end(),
            });
        }
        Ok(Self(canonical_rotation(path)))
    }

    /// Creates the cycle visiting `vertices` and returning to the first one.
    ///
    /// `[1, 2, 3]` is the cycle `1 → 2 → 3 → 1`.
    pub fn through<V: Copy + Into<Vertex>>(vertices: &[V]) -> Result<Self, PathError> {
        let (&first, _) = vertices.split_first().ok_or(PathError::EmptyCycle)?;
        let mut closed: Vec<Vertex> = vertices.iter().map(|&v| v.into()).collect();
        closed.push(first.into());
        let path = Path::through(&closed).ok_or(PathError::EmptyCycle)?;
        Self::new(path)
    }

    /// Returns the canonical path of the cycle.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Returns the arrows of the canonical rotation.
    #[inline]
    pub fn arrows(&self) -> &[Arrow] {
        self.0.arrows()
    }

    /// Returns the number of arrows.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Cycles always contain at least one arrow.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Checks whether the cycle passes through `arrow`.
    pub fn contains_arrow(&self, arrow: &Arrow) -> bool {
        self.0.arrows.contains(arrow)
    }

    /// For every occurrence of `arrow`, the rest of the cycle read from the
    /// head of that occurrence back to its tail.
    ///
    /// These are the terms of the cyclic derivative of the cycle with
    /// respect to `arrow`.
    pub fn remainders_after(&self, arrow: &Arrow) -> Vec<Path> {
        let arrows = self.arrows();
        let n = arrows.len();
        arrows
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == arrow)
            .map(|(i, a)| {
                let rest = (1..n).map(|offset| arrows[(i + offset) % n]).collect();
                Path::from_parts_unchecked(a.target, rest)
            })
            .collect()
    }

    /// Returns the same cycle in the opposite quiver.
    pub fn reversed(&self) -> Self {
        Self(canonical_rotation(self.0.reversed()))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0)
    }
}

/// Returns the rotation of a closed path with the smallest arrow sequence.
fn canonical_rotation(path: Path) -> Path {
    let n = path.arrows.len();
    let best = (1..n).fold(0, |best, candidate| {
        let rotated = (0..n).map(|k| path.arrows[(candidate + k) % n]);
        let current = (0..n).map(|k| path.arrows[(best + k) % n]);
        if rotated.lt(current) {
            candidate
        } else {
            best
        }
    });
    if best == 0 {
        return path;
    }
    let arrows: Vec<Arrow> = (0..n).map(|k| path.arrows[(best + k) % n]).collect();
    Path {
        start: arrows[0].source,
        arrows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(source: u32, target: u32) -> Arrow {
        Arrow::new(Vertex::new(source), Vertex::new(target))
    }

    #[test]
    fn path_validation() {
        let v = Vertex::new;
        assert!(Path::new(v(1), vec![arrow(1, 2), arrow(2, 3)]).is_ok());
        assert_eq!(
            Path::new(v(1), vec![arrow(2, 3)]),
            Err(PathError::StartMismatch {
                start: v(1),
                arrow: arrow(2, 3)
            })
        );
        assert_eq!(
            Path::new(v(1), vec![arrow(1, 2), arrow(3, 4)]),
            Err(PathError::NotComposable {
                index: 1,
                previous: arrow(1, 2),
                next: arrow(3, 4)
            })
        );
    }

    #[test]
    fn endpoints_and_extension() {
        let path = Path::through(&[1u32, 2, 3]).unwrap();
        assert_eq!(path.start(), Vertex::new(1));
        assert_eq!(path.end(), Vertex::new(3));
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "1->2->3");

        let longer = path.extended(arrow(3, 1)).unwrap();
        assert!(longer.is_closed());
        assert!(path.extended(arrow(2, 1)).is_err());

        let stationary = Path::stationary(Vertex::new(4));
        assert!(stationary.is_empty());
        assert_eq!(stationary.end(), Vertex::new(4));
        assert_eq!(stationary.vertices().count(), 1);
    }

    #[test]
    fn suffix_replacement_and_reversal() {
        let path = Path::through(&[1u32, 2, 3, 4]).unwrap();
        let replaced = path.with_suffix_replaced(2, &[arrow(2, 5), arrow(5, 4)]);
        assert_eq!(replaced, Path::through(&[1u32, 2, 5, 4]).unwrap());
        assert_eq!(path.reversed(), Path::through(&[4u32, 3, 2, 1]).unwrap());
        assert_eq!(path.reversed().reversed(), path);
    }

    #[test]
    fn rotations_canonicalize_equal() {
        let a = Cycle::through(&[1u32, 2, 3]).unwrap();
        let b = Cycle::through(&[2u32, 3, 1]).unwrap();
        let c = Cycle::through(&[3u32, 1, 2]).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.path().start(), Vertex::new(1));
        // Opposite orientation is a different cycle.
        assert_ne!(a, Cycle::through(&[1u32, 3, 2]).unwrap());
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let cycle = Cycle::through(&[5u32, 3, 4, 1]).unwrap();
        let again = Cycle::new(cycle.path().clone()).unwrap();
        assert_eq!(cycle, again);
        assert_eq!(cycle.path(), again.path());
    }

    #[test]
    fn rejects_open_and_empty_cycles() {
        assert_eq!(Cycle::through::<u32>(&[]), Err(PathError::EmptyCycle));
        let open = Path::through(&[1u32, 2]).unwrap();
        assert!(matches!(Cycle::new(open), Err(PathError::NotClosed { .. })));
        assert_eq!(
            Cycle::new(Path::stationary(Vertex::new(1))),
            Err(PathError::EmptyCycle)
        );
    }

    #[test]
    fn remainders_are_cyclic_derivative_terms() {
        let cycle = Cycle::through(&[1u32, 2, 3, 4]).unwrap();
        let rest = cycle.remainders_after(&arrow(3, 4));
        assert_eq!(rest, vec![Path::through(&[4u32, 1, 2, 3]).unwrap()]);
        assert!(cycle.remainders_after(&arrow(2, 1)).is_empty());
    }

    #[test]
    fn reversed_cycle() {
        let cycle = Cycle::through(&[1u32, 2, 3]).unwrap();
        assert_eq!(cycle.reversed(), Cycle::through(&[3u32, 2, 1]).unwrap());
        assert_eq!(cycle.reversed().reversed(), cycle);
    }
}
