use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content hash of a property, a node, or a whole subtree.
///
/// A `Digest` is a BLAKE3 hash. Identical content always produces the same
/// digest, so digest equality is a cheap stand-in for deep structural
/// comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create a `Digest` from a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The null digest (all zeros). Represents "not yet computed".
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null digest.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Domain-separated incremental BLAKE3 hasher.
///
/// Each hasher starts from a domain tag (e.g. `"arbor-prop-v1"`) so hashes
/// of different object kinds can never collide: a property and a node that
/// happen to encode to the same bytes still produce different digests.
pub struct TreeHasher {
    inner: blake3::Hasher,
}

impl TreeHasher {
    /// Create a hasher with a custom domain tag.
    pub fn new(domain: &'static str) -> Self {
        let mut inner = blake3::Hasher::new();
        inner.update(domain.as_bytes());
        inner.update(b":");
        Self { inner }
    }

    /// Hasher for individual property values.
    pub fn property() -> Self {
        Self::new("arbor-prop-v1")
    }

    /// Hasher for a node's own attributes and properties.
    pub fn node() -> Self {
        Self::new("arbor-node-v1")
    }

    /// Hasher for a full subtree (node hash plus child subtree hashes).
    pub fn subtree() -> Self {
        Self::new("arbor-subtree-v1")
    }

    /// Feed raw bytes.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Feed a length-prefixed string. The prefix keeps adjacent fields from
    /// bleeding into each other.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.inner.update(&(s.len() as u64).to_le_bytes());
        self.inner.update(s.as_bytes());
        self
    }

    /// Feed a single boolean.
    pub fn update_bool(&mut self, b: bool) -> &mut Self {
        self.inner.update(&[u8::from(b)]);
        self
    }

    /// Feed a single tag byte.
    pub fn update_u8(&mut self, b: u8) -> &mut Self {
        self.inner.update(&[b]);
        self
    }

    /// Feed a previously computed digest.
    pub fn update_digest(&mut self, digest: &Digest) -> &mut Self {
        self.inner.update(digest.as_bytes());
        self
    }

    /// Finish and produce the digest.
    pub fn finalize(&self) -> Digest {
        Digest(*self.inner.finalize().as_bytes())
    }
}
