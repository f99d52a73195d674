//! Arena of equivalence-class records with signed union-find.
//!
//! Provides `ClassHandle` (a dense, total-orderable identifier) and
//! `ClassArena` (contiguous storage of class records). Records are merged with
//! a path-compressed union-find; every record stores its sign relative to its
//! parent, so `find` also yields the sign of a record relative to its root.
//!
//! # Determinism
//! - `ClassHandle` ordering is by its inner `u32`.
//! - Iteration order over records is by index (allocation order).
//! - On a union of equal rank the root with the smaller handle wins.
//!
//! # Citations
//! - Tarjan, "Efficiency of a good but not linear set union algorithm", JACM (1975)

use std::fmt;
use std::ops::{Mul, Neg};

/// A multiplier in `{+1, −1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Sign {
    /// `+1`.
    #[default]
    Positive,
    /// `−1`.
    Negative,
}

impl Sign {
    /// Returns the sign of a unit coefficient, `None` for anything else.
    pub fn of_unit(coefficient: i64) -> Option<Self> {
        match coefficient {
            1 => Some(Sign::Positive),
            -1 => Some(Sign::Negative),
            _ => None,
        }
    }

    /// Returns `+1` or `−1`.
    #[inline]
    pub fn as_i64(self) -> i64 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    #[inline]
    fn mul(self, rhs: Sign) -> Sign {
        if self == rhs {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

impl Neg for Sign {
    type Output = Sign;

    #[inline]
    fn neg(self) -> Sign {
        self * Sign::Negative
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
        }
    }
}

/// Dense identifier of a class record.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassHandle(u32);

impl ClassHandle {
    /// Returns the raw index.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassHandle({})", self.0)
    }
}

/// Outcome of merging two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionOutcome {
    /// Two different classes were merged under `root`.
    Merged {
        /// Root of the merged class.
        root: ClassHandle,
    },
    /// Both records already shared a root with a consistent sign.
    AlreadyMerged,
    /// Both records already shared a root, but the requested sign implies
    /// that the class equals its own negative. The class becomes zero.
    SignConflict {
        /// Root of the conflicting class.
        root: ClassHandle,
    },
}

#[derive(Debug, Clone)]
struct ClassSlot<T> {
    data: T,
    parent: u32,
    /// Sign of this record relative to `parent`.
    sign: Sign,
    rank: u8,
    /// Forced zero by a relation. Only meaningful on roots.
    zero: bool,
    /// Equal to its own negative. Only meaningful on roots.
    self_negating: bool,
}

/// Contiguous storage for class records with signed union-find.
#[derive(Debug, Clone)]
pub struct ClassArena<T> {
    slots: Vec<ClassSlot<T>>,
}

impl<T> ClassArena<T> {
    /// Creates a new empty arena.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Allocates a new singleton class holding `data`.
    pub fn allocate(&mut self, data: T) -> ClassHandle {
        let idx = self.slots.len() as u32;
        self.slots.push(ClassSlot {
            data,
            parent: idx,
            sign: Sign::Positive,
            rank: 0,
            zero: false,
            self_negating: false,
        });
        ClassHandle(idx)
    }

    /// Returns the record data stored at `handle`.
    pub fn get(&self, handle: ClassHandle) -> Option<&T> {
        self.slots.get(handle.index()).map(|slot| &slot.data)
    }

    /// Returns the record data stored at `handle` mutably.
    pub fn get_mut(&mut self, handle: ClassHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.index()).map(|slot| &mut slot.data)
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks whether the arena holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all handles in allocation order.
    pub fn handles(&self) -> impl Iterator<Item = ClassHandle> {
        (0..self.slots.len() as u32).map(ClassHandle)
    }

    /// Returns the root of `handle` and the sign of `handle` relative to it.
    ///
    /// Compresses the path from `handle` to the root.
    ///
    /// # Panics
    /// Panics if `handle` was not allocated by this arena.
    pub fn find(&mut self, handle: ClassHandle) -> (ClassHandle, Sign) {
        let mut trail = Vec::new();
        let mut current = handle.0;
        while self.slots[current as usize].parent != current {
            trail.push(current);
            current = self.slots[current as usize].parent;
        }
        let root = current;
        // Walk back from the node closest to the root, accumulating signs.
        let mut to_root = Sign::Positive;
        for &idx in trail.iter().rev() {
            let slot = &mut self.slots[idx as usize];
            to_root = slot.sign * to_root;
            slot.sign = to_root;
            slot.parent = root;
        }
        let sign = if trail.is_empty() {
            Sign::Positive
        } else {
            self.slots[handle.index()].sign
        };
        (ClassHandle(root), sign)
    }

    /// Records `element(a) = sign · element(b)`.
    pub fn union(&mut self, a: ClassHandle, b: ClassHandle, sign: Sign) -> UnionOutcome {
        let (root_a, sign_a) = self.find(a);
        let (root_b, sign_b) = self.find(b);
        // root_a = sign_a · a = sign_a · sign · b = sign_a · sign · sign_b · root_b
        let relative = sign_a * sign * sign_b;
        if root_a == root_b {
            if relative == Sign::Positive {
                return UnionOutcome::AlreadyMerged;
            }
            self.slots[root_a.index()].self_negating = true;
            return UnionOutcome::SignConflict { root: root_a };
        }

        let (rank_a, rank_b) = (self.slots[root_a.index()].rank, self.slots[root_b.index()].rank);
        let (root, child) = if rank_a > rank_b || (rank_a == rank_b && root_a < root_b) {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        let (child_zero, child_negating) = {
            let slot = &self.slots[child.index()];
            (slot.zero, slot.self_negating)
        };
        {
            let slot = &mut self.slots[child.index()];
            slot.parent = root.0;
            slot.sign = relative;
        }
        let slot = &mut self.slots[root.index()];
        if rank_a == rank_b {
            slot.rank = slot.rank.saturating_add(1);
        }
        slot.zero |= child_zero;
        slot.self_negating |= child_negating;
        UnionOutcome::Merged { root }
    }

    /// Marks the class containing `handle` as zero.
    pub fn mark_zero(&mut self, handle: ClassHandle) {
        let (root, _) = self.find(handle);
        self.slots[root.index()].zero = true;
    }

    /// Checks whether the class containing `handle` is zero, either by a
    /// relation or because it equals its own negative.
    pub fn is_zero(&mut self, handle: ClassHandle) -> bool {
        let (root, _) = self.find(handle);
        let slot = &self.slots[root.index()];
        slot.zero || slot.self_negating
    }

    /// Checks whether the class containing `handle` equals its own negative
    /// while no relation forces it to zero.
    ///
    /// Over a field of characteristic other than two such a class is zero
    /// only because of the sign clash; this is a cancellativity failure.
    pub fn is_self_negating(&mut self, handle: ClassHandle) -> bool {
        let (root, _) = self.find(handle);
        let slot = &self.slots[root.index()];
        slot.self_negating && !slot.zero
    }
}

impl<T> Default for ClassArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_arithmetic() {
        assert_eq!(Sign::Negative * Sign::Negative, Sign::Positive);
        assert_eq!(Sign::Positive * Sign::Negative, Sign::Negative);
        assert_eq!(-Sign::Positive, Sign::Negative);
        assert_eq!(Sign::of_unit(-1), Some(Sign::Negative));
        assert_eq!(Sign::of_unit(2), None);
        assert_eq!(Sign::Negative.as_i64(), -1);
    }

    #[test]
    fn arena_basic() {
        let mut arena: ClassArena<&'static str> = ClassArena::new();
        assert!(arena.is_empty());
        let a = arena.allocate("a");
        let b = arena.allocate("b");
        assert_eq!(a.as_u32(), 0);
        assert_eq!(b.as_u32(), 1);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.find(a), (a, Sign::Positive));
        assert_eq!(arena.handles().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn signs_propagate_through_chains() {
        let mut arena = ClassArena::new();
        let h: Vec<_> = (0..4).map(|i| arena.allocate(i)).collect();
        // h0 = -h1, h1 = -h2, h2 = +h3
        arena.union(h[0], h[1], Sign::Negative);
        arena.union(h[1], h[2], Sign::Negative);
        arena.union(h[2], h[3], Sign::Positive);
        let (root, _) = arena.find(h[0]);
        for &x in &h {
            assert_eq!(arena.find(x).0, root);
        }
        // h0 = -h1 = h2 = h3, so all of h0, h2, h3 share a sign and h1 differs.
        let s0 = arena.find(h[0]).1;
        assert_eq!(arena.find(h[2]).1, s0);
        assert_eq!(arena.find(h[3]).1, s0);
        assert_eq!(arena.find(h[1]).1, -s0);
        assert_eq!(arena.union(h[0], h[3], Sign::Positive), UnionOutcome::AlreadyMerged);
        assert!(!arena.is_zero(h[0]));
    }

    #[test]
    fn sign_conflict_marks_zero() {
        let mut arena = ClassArena::new();
        let a = arena.allocate(());
        let b = arena.allocate(());
        let c = arena.allocate(());
        arena.union(a, b, Sign::Positive);
        arena.union(b, c, Sign::Positive);
        assert!(matches!(
            arena.union(c, a, Sign::Negative),
            UnionOutcome::SignConflict { .. }
        ));
        assert!(arena.is_zero(a));
        assert!(arena.is_zero(c));
        assert!(arena.is_self_negating(b));
        // A relation forcing the class to zero explains the clash.
        arena.mark_zero(c);
        assert!(!arena.is_self_negating(b));
        assert!(arena.is_zero(b));
    }

    #[test]
    fn zero_spreads_on_merge() {
        let mut arena = ClassArena::new();
        let a = arena.allocate(());
        let b = arena.allocate(());
        let c = arena.allocate(());
        arena.mark_zero(b);
        assert!(!arena.is_zero(a));
        arena.union(a, b, Sign::Negative);
        assert!(arena.is_zero(a));
        assert!(!arena.is_zero(c));
    }

    #[test]
    fn equal_rank_prefers_smaller_root() {
        let mut arena = ClassArena::new();
        let a = arena.allocate(());
        let b = arena.allocate(());
        assert_eq!(arena.union(b, a, Sign::Positive), UnionOutcome::Merged { root: a });
    }
}
