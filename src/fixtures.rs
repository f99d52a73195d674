//! Quivers with potential shared by the unit and end-to-end tests.

use crate::core::{Arrow, Quiver, Vertex};
use crate::path::Cycle;
use crate::potential::{Potential, QuiverWithPotential};

fn qp(vertices: u32, arrows: &[(u32, u32)], cycles: &[(&[u32], i64)]) -> QuiverWithPotential {
    let quiver = Quiver::new(
        (1..=vertices).map(Vertex::new),
        arrows
            .iter()
            .map(|&(s, t)| Arrow::new(Vertex::new(s), Vertex::new(t))),
    )
    .unwrap();
    let potential = Potential::from_terms(
        cycles
            .iter()
            .map(|&(cycle, c)| (Cycle::through(cycle).unwrap(), c)),
    );
    QuiverWithPotential::new(quiver, potential).unwrap()
}

/// `1 → 2 → … → n → 1` with the cycle itself as potential.
pub fn oriented_cycle(n: u32) -> QuiverWithPotential {
    let arrows: Vec<(u32, u32)> = (1..=n).map(|v| (v, v % n + 1)).collect();
    let cycle: Vec<u32> = (1..=n).collect();
    qp(n, &arrows, &[(&cycle[..], 1)])
}

/// Triangle subdivided into four oriented triangles.
///
/// Corners `A=1, B=2, C=3`, midpoints `D=4, E=5, F=6`. The inner triangle
/// `D → E → F` has coefficient `+1`, the three corner triangles
/// `outer`.
pub fn triforce(outer: i64) -> QuiverWithPotential {
    let cycles: [(&[u32], i64); 4] = [
        (&[4, 5, 6], 1),
        (&[4, 5, 2], outer),
        (&[5, 6, 3], outer),
        (&[6, 4, 1], outer),
    ];
    qp(
        6,
        &[(4, 5), (5, 6), (6, 4), (5, 2), (2, 4), (6, 3), (3, 5), (4, 1), (1, 6)],
        &cycles,
    )
}

/// Triangle with `n` segments per side, cut into `n²` oriented triangles.
///
/// Rows are counted from the apex; vertex `k` of row `r` (`0 ≤ k ≤ r`) is
/// `r(r+1)/2 + k + 1`. Upward triangles carry all arrows (apex, lower left,
/// lower right) with coefficient `+1`; downward triangles have `-1`.
/// `triangle_grid(2)` is the triforce up to labels, `triangle_grid(3)` the
/// tetraforce.
pub fn triangle_grid(n: u32) -> QuiverWithPotential {
    let id = |row: u32, k: u32| row * (row + 1) / 2 + k + 1;
    let mut arrows = Vec::new();
    let mut cycles: Vec<(Vec<u32>, i64)> = Vec::new();
    for row in 0..n {
        for k in 0..=row {
            let (top, left, right) = (id(row, k), id(row + 1, k), id(row + 1, k + 1));
            arrows.extend([(top, left), (left, right), (right, top)]);
            cycles.push((vec![top, left, right], 1));
        }
    }
    for row in 1..n {
        for k in 0..row {
            cycles.push((vec![id(row, k), id(row, k + 1), id(row + 1, k + 1)], -1));
        }
    }
    let cycles: Vec<(&[u32], i64)> = cycles.iter().map(|(c, k)| (c.as_slice(), *k)).collect();
    qp(id(n, n), &arrows, &cycles)
}

/// Octahedron with poles `1` and `6` and equator `2 4 3 5`.
///
/// Every arrow lies on two of the eight faces. The face `3 → 5 → 6` has
/// coefficient `twisted`, every other face `+1`. With `twisted = -1` the
/// relations identify a path with its own negative.
pub fn octahedron(twisted: i64) -> QuiverWithPotential {
    let cycles: [(&[u32], i64); 8] = [
        (&[1, 2, 4], 1),
        (&[1, 3, 4], 1),
        (&[1, 2, 5], 1),
        (&[1, 3, 5], 1),
        (&[2, 4, 6], 1),
        (&[2, 5, 6], 1),
        (&[3, 4, 6], 1),
        (&[3, 5, 6], twisted),
    ];
    qp(
        6,
        &[
            (1, 2),
            (1, 3),
            (2, 4),
            (3, 4),
            (2, 5),
            (3, 5),
            (4, 6),
            (5, 6),
            (4, 1),
            (5, 1),
            (6, 2),
            (6, 3),
        ],
        &cycles,
    )
}

/// Two oriented triangles sharing the vertex `hub`, the other four vertices
/// taken in increasing order.
///
/// Every relation is a zero relation and `hub` has two maximal classes.
pub fn triangles_glued_at(hub: u32) -> QuiverWithPotential {
    let others: Vec<u32> = (1..=5).filter(|&v| v != hub).collect();
    let (a, b, c, d) = (others[0], others[1], others[2], others[3]);
    let cycles: [(&[u32], i64); 2] = [(&[hub, a, b], 1), (&[hub, c, d], 1)];
    qp(5, &[(hub, a), (a, b), (b, hub), (hub, c), (c, d), (d, hub)], &cycles)
}

/// Two 4-cycles `a b c d` and `a b e f` sharing the sub-path `a b`.
///
/// `a: 1→2, b: 2→3, c: 3→4, d: 4→1, e: 3→5, f: 5→1`; the relation from `a`
/// gives `c d a = e f a` with `c d ≠ e f`.
pub fn classic_non_cancellative() -> QuiverWithPotential {
    let cycles: [(&[u32], i64); 2] = [(&[1, 2, 3, 4], 1), (&[1, 2, 3, 5], -1)];
    qp(5, &[(1, 2), (2, 3), (3, 4), (4, 1), (3, 5), (5, 1)], &cycles)
}

/// Triangle `1 → 2 → 3` and square `1 → 2 → 4 → 5` sharing the arrow `1 → 2`.
pub fn triangle_and_square() -> QuiverWithPotential {
    let cycles: [(&[u32], i64); 2] = [(&[1, 2, 3], 1), (&[1, 2, 4, 5], -1)];
    qp(5, &[(1, 2), (2, 3), (3, 1), (2, 4), (4, 5), (5, 1)], &cycles)
}

/// Three triangles through the arrow `1 → 2`.
pub fn three_triangles_on_one_arrow() -> QuiverWithPotential {
    let cycles: [(&[u32], i64); 3] = [(&[1, 2, 3], 1), (&[1, 2, 4], -1), (&[1, 2, 5], 1)];
    qp(5, &[(1, 2), (2, 3), (3, 1), (2, 4), (4, 1), (2, 5), (5, 1)], &cycles)
}

/// Replaces the coefficient of the cycle through `vertices`.
pub fn with_coefficient(qp: QuiverWithPotential, vertices: &[u32], coefficient: i64) -> QuiverWithPotential {
    let cycle = Cycle::through(vertices).unwrap();
    let mut potential = qp.potential().clone();
    let current = potential.coefficient(&cycle);
    potential.add_cycle(cycle, coefficient - current);
    QuiverWithPotential::new(qp.quiver().clone(), potential).unwrap()
}

/// Flips the sign of every coefficient.
pub fn negated(qp: &QuiverWithPotential) -> QuiverWithPotential {
    let potential = Potential::from_terms(qp.potential().terms().map(|(cycle, c)| (cycle.clone(), -c)));
    QuiverWithPotential::new(qp.quiver().clone(), potential).unwrap()
}
