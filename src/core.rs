//! Core data structures for quivers.
//!
//! A quiver is a directed graph given by a finite vertex set and a finite set
//! of arrows. Quivers in this crate have at most one arrow per ordered pair of
//! vertices and no loops; arrows are therefore identified by their endpoints.
//!
//! # Citations
//! - Gabriel, "Unzerlegbare Darstellungen I", Manuscripta Math. (1972) – quivers
//! - Assem, Simson, Skowroński, "Elements of the Representation Theory of
//!   Associative Algebras", Vol. 1, Chapter II (2006) – path algebras

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Identifier of a vertex in a quiver.
///
/// Uses a transparent `u32` wrapper for cheap comparison and hashing.
///
/// # Invariant
/// - Equality, order and hash are based solely on the inner `u32`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vertex(u32);

impl Vertex {
    /// Creates a new `Vertex` from a raw `u32`.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` representation.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Vertex {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed arrow `source → target`.
///
/// Ordering is by `(source, target)`, which makes the lexicographic order on
/// arrow sequences coincide with the order on the visited vertex sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Arrow {
    /// Tail of the arrow.
    pub source: Vertex,
    /// Head of the arrow.
    pub target: Vertex,
}

impl Arrow {
    /// Creates an arrow from `source` to `target`.
    #[inline]
    pub const fn new(source: Vertex, target: Vertex) -> Self {
        Self { source, target }
    }

    /// Returns the arrow pointing the other way.
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    /// Checks whether the arrow starts and ends at the same vertex.
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Error type for quiver construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuiverError {
    /// The same vertex was listed twice.
    #[error("duplicate vertex {0}")]
    DuplicateVertex(Vertex),
    /// The same arrow was listed twice.
    #[error("duplicate arrow {0}")]
    DuplicateArrow(Arrow),
    /// An arrow endpoint is not a vertex of the quiver.
    #[error("arrow {arrow} references vertex {vertex} which is not in the quiver")]
    MissingVertex {
        /// Offending arrow.
        arrow: Arrow,
        /// Endpoint that is missing.
        vertex: Vertex,
    },
    /// Loops are not supported.
    #[error("loop {0} is not supported")]
    Loop(Arrow),
}

/// A finite quiver with at most one arrow per ordered pair of vertices.
///
/// Arrows keep the order in which they were supplied and are addressed by a
/// dense index (`0..arrow_count()`); the rule automaton uses that index as
/// its alphabet.
///
/// # Invariants
/// - Vertices are unique and stored in ascending order.
/// - Every arrow endpoint is a vertex of the quiver.
/// - Arrows are unique; no arrow is a loop.
/// - Outgoing adjacency lists are sorted by arrow, fixing the exploration
///   order used by the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiver {
    vertices: Vec<Vertex>,
    arrows: Vec<Arrow>,
    arrow_indices: HashMap<Arrow, usize>,
    outgoing: HashMap<Vertex, Vec<usize>>,
    incoming: HashMap<Vertex, Vec<usize>>,
}

impl Quiver {
    /// Creates a quiver, validating the invariants listed on the type.
    pub fn new<V, A>(vertices: V, arrows: A) -> Result<Self, QuiverError>
    where
        V: IntoIterator<Item = Vertex>,
        A: IntoIterator<Item = Arrow>,
    {
        let mut vertex_set = BTreeSet::new();
        for vertex in vertices {
            if !vertex_set.insert(vertex) {
                return Err(QuiverError::DuplicateVertex(vertex));
            }
        }

        let mut quiver = Self {
            vertices: vertex_set.iter().copied().collect(),
            arrows: Vec::new(),
            arrow_indices: HashMap::new(),
            outgoing: vertex_set.iter().map(|&v| (v, Vec::new())).collect(),
            incoming: vertex_set.iter().map(|&v| (v, Vec::new())).collect(),
        };

        for arrow in arrows {
            if arrow.is_loop() {
                return Err(QuiverError::Loop(arrow));
            }
            for vertex in [arrow.source, arrow.target] {
                if !vertex_set.contains(&vertex) {
                    return Err(QuiverError::MissingVertex { arrow, vertex });
                }
            }
            if quiver.arrow_indices.contains_key(&arrow) {
                return Err(QuiverError::DuplicateArrow(arrow));
            }
            let index = quiver.arrows.len();
            quiver.arrows.push(arrow);
            quiver.arrow_indices.insert(arrow, index);
        }

        for (index, arrow) in quiver.arrows.iter().enumerate() {
            if let Some(list) = quiver.outgoing.get_mut(&arrow.source) {
                list.push(index);
            }
            if let Some(list) = quiver.incoming.get_mut(&arrow.target) {
                list.push(index);
            }
        }
        let arrows = &quiver.arrows;
        for list in quiver.outgoing.values_mut().chain(quiver.incoming.values_mut()) {
            list.sort_by_key(|&index| arrows[index]);
        }
        Ok(quiver)
    }

    /// Returns the vertices in ascending order.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the arrows in insertion order.
    #[inline]
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of arrows.
    #[inline]
    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    /// Checks whether `vertex` belongs to the quiver.
    #[inline]
    pub fn contains_vertex(&self, vertex: Vertex) -> bool {
        self.outgoing.contains_key(&vertex)
    }

    /// Checks whether `arrow` belongs to the quiver.
    #[inline]
    pub fn contains_arrow(&self, arrow: &Arrow) -> bool {
        self.arrow_indices.contains_key(arrow)
    }

    /// Returns the dense index of `arrow`, if present.
    #[inline]
    pub fn arrow_index(&self, arrow: &Arrow) -> Option<usize> {
        self.arrow_indices.get(arrow).copied()
    }

    /// Returns the arrow stored at `index`, if any.
    #[inline]
    pub fn arrow(&self, index: usize) -> Option<Arrow> {
        self.arrows.get(index).copied()
    }

    /// Indices of the arrows leaving `vertex`, in adjacency order.
    pub fn outgoing_indices(&self, vertex: Vertex) -> &[usize] {
        self.outgoing.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the arrows entering `vertex`, in adjacency order.
    pub fn incoming_indices(&self, vertex: Vertex) -> &[usize] {
        self.incoming.get(&vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Arrows leaving `vertex`, in adjacency order.
    pub fn outgoing(&self, vertex: Vertex) -> impl Iterator<Item = Arrow> + '_ {
        self.outgoing_indices(vertex).iter().map(|&i| self.arrows[i])
    }

    /// Arrows entering `vertex`, in adjacency order.
    pub fn incoming(&self, vertex: Vertex) -> impl Iterator<Item = Arrow> + '_ {
        self.incoming_indices(vertex).iter().map(|&i| self.arrows[i])
    }

    /// Returns the opposite quiver (every arrow reversed).
    ///
    /// Arrow indices are preserved: arrow `i` of the opposite quiver is the
    /// reverse of arrow `i` of `self`.
    pub fn opposite(&self) -> Self {
        let arrows: Vec<Arrow> = self.arrows.iter().map(Arrow::reversed).collect();
        let arrow_indices = arrows.iter().enumerate().map(|(i, &a)| (a, i)).collect();
        Self {
            vertices: self.vertices.clone(),
            arrows,
            arrow_indices,
            outgoing: self.incoming.clone(),
            incoming: self.outgoing.clone(),
        }
    }
}
