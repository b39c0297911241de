//! Pluggable hash strategies.
//!
//! Every node of one tree is hashed with the same strategy. Internal nodes
//! hash the plain concatenation of their children's digests, left first, with
//! no separator or domain tag: `H(left || right)`.

use merkle_costs::{CostResult, CostsExt, OperationCost};
use sha2::Digest as _;

use crate::{Error, Result};

/// Output of a hash strategy. The width is fixed per strategy.
pub type Digest = Vec<u8>;

/// A single-use hashing state.
pub trait NodeHasher {
    /// Feed `bytes` into the hasher.
    ///
    /// Implementations that can refuse input report it as
    /// [`Error::HashWrite`].
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Consume the hasher and produce the digest.
    fn finish(self) -> Digest;
}

/// A one-way hash function used uniformly for every node of a tree.
///
/// Strategies are plain values owned by the tree; they must be stateless from
/// the tree's point of view so the same input always yields the same digest.
pub trait HashStrategy {
    /// Fresh hashing state produced for every digest.
    type Hasher: NodeHasher;

    /// Start a new digest computation.
    fn hasher(&self) -> Self::Hasher;

    /// Digest width in bytes.
    fn output_len(&self) -> usize;
}

/// SHA-256, the default strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Strategy;

/// Hashing state of [`Sha256Strategy`].
pub struct Sha256Hasher(sha2::Sha256);

impl NodeHasher for Sha256Hasher {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.update(bytes);
        Ok(())
    }

    fn finish(self) -> Digest {
        self.0.finalize().to_vec()
    }
}

impl HashStrategy for Sha256Strategy {
    type Hasher = Sha256Hasher;

    fn hasher(&self) -> Self::Hasher {
        Sha256Hasher(sha2::Sha256::new())
    }

    fn output_len(&self) -> usize {
        32
    }
}

/// Blake3 with 32-byte output.
#[cfg(feature = "blake3")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Strategy;

/// Hashing state of [`Blake3Strategy`].
#[cfg(feature = "blake3")]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl NodeHasher for Blake3Hasher {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.update(bytes);
        Ok(())
    }

    fn finish(self) -> Digest {
        self.0.finalize().as_bytes().to_vec()
    }
}

#[cfg(feature = "blake3")]
impl HashStrategy for Blake3Strategy {
    type Hasher = Blake3Hasher;

    fn hasher(&self) -> Self::Hasher {
        Blake3Hasher(blake3::Hasher::new())
    }

    fn output_len(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// Digest of an internal node: `H(left || right)`.
pub fn node_digest<H: HashStrategy>(strategy: &H, left: &[u8], right: &[u8]) -> Result<Digest> {
    let mut input = Vec::with_capacity(left.len() + right.len());
    input.extend_from_slice(left);
    input.extend_from_slice(right);
    let mut hasher = strategy.hasher();
    hasher.write(&input)?;
    Ok(hasher.finish())
}

/// [`node_digest`] with its cost attached.
pub(crate) fn costed_node_digest<H: HashStrategy>(
    strategy: &H,
    left: &[u8],
    right: &[u8],
) -> CostResult<Digest, Error> {
    node_digest(strategy, left, right).wrap_with_cost(OperationCost::with_hash_node_calls(1))
}
