//! Deterministic fingerprints of quivers with potential.
//!
//! Provides domain-separated SHA-256 hashing over canonical byte encodings so
//! that equal values hash equally across runs and processes. Fingerprints key
//! the rule-tree cache.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use crate::core::{Arrow, Quiver, Vertex};
use crate::path::{Cycle, Path};
use crate::potential::{Potential, QuiverWithPotential};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain tag for quiver fingerprints.
pub const DOMAIN_QUIVER_V0: &[u8] = b"QUIVER_V0";
/// Domain tag for potential fingerprints.
pub const DOMAIN_POTENTIAL_V0: &[u8] = b"POTENTIAL_V0";
/// Domain tag for quiver-with-potential fingerprints.
pub const DOMAIN_QP_V0: &[u8] = b"QP_V0";

/// A 256-bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    /// Creates a zero hash (all zeros).
    #[inline]
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes SHA-256 of the given data with domain separation.
    ///
    /// Input is `b"NKY:<domain>:v1" || length_prefix(data) || data`, the
    /// length prefix being a 64-bit little-endian byte count.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"NKY:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for HashValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 4 bytes in hex.
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Values with a canonical byte encoding.
pub trait Canonicalizable {
    /// Serialize to canonical byte representation.
    fn to_canonical_bytes(&self) -> Vec<u8>;

    /// Compute domain-separated hash of canonical bytes.
    fn fingerprint(&self, domain: &[u8]) -> HashValue {
        HashValue::hash_with_domain(domain, &self.to_canonical_bytes())
    }
}

fn put_vertex(out: &mut Vec<u8>, vertex: Vertex) {
    out.extend_from_slice(&vertex.as_u32().to_le_bytes());
}

fn put_arrow(out: &mut Vec<u8>, arrow: &Arrow) {
    put_vertex(out, arrow.source);
    put_vertex(out, arrow.target);
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_le_bytes());
}

impl Canonicalizable for Path {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + 8 * self.len());
        put_vertex(&mut out, self.start());
        put_len(&mut out, self.len());
        for arrow in self.arrows() {
            put_arrow(&mut out, arrow);
        }
        out
    }
}

impl Canonicalizable for Cycle {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        self.path().to_canonical_bytes()
    }
}

impl Canonicalizable for Quiver {
    /// Vertices ascending, then arrows sorted; insertion order does not matter.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + 4 * self.vertex_count() + 8 * self.arrow_count());
        put_len(&mut out, self.vertex_count());
        for &vertex in self.vertices() {
            put_vertex(&mut out, vertex);
        }
        let mut arrows = self.arrows().to_vec();
        arrows.sort();
        put_len(&mut out, arrows.len());
        for arrow in &arrows {
            put_arrow(&mut out, arrow);
        }
        out
    }
}

impl Canonicalizable for Potential {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_len(&mut out, self.len());
        for (cycle, coefficient) in self.terms() {
            let bytes = cycle.to_canonical_bytes();
            put_len(&mut out, bytes.len());
            out.extend_from_slice(&bytes);
            out.extend_from_slice(&coefficient.to_le_bytes());
        }
        out
    }
}

impl Canonicalizable for QuiverWithPotential {
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(self.quiver().fingerprint(DOMAIN_QUIVER_V0).as_bytes());
        out.extend_from_slice(self.potential().fingerprint(DOMAIN_POTENTIAL_V0).as_bytes());
        out
    }
}

impl QuiverWithPotential {
    /// Fingerprint under [`DOMAIN_QP_V0`].
    pub fn qp_fingerprint(&self) -> HashValue {
        self.fingerprint(DOMAIN_QP_V0)
    }
}
