//! Incrementally appendable binary Merkle tree.
//!
//! A [`MerkleTree`] commits to an ordered list of content items with a single
//! root digest, hands out inclusion proofs for individual items and verifies
//! its own integrity against the live contents.
//!
//! # Core types
//!
//! - [`MerkleTree`]: build, append, rebuild, prove and verify.
//! - [`Content`]: what an item must provide: a digest and an equality test.
//! - [`HashStrategy`]: the hash used for every node ([`Sha256Strategy`] by
//!   default, `Blake3Strategy` with the `blake3` feature).
//! - [`MerkleProof`]: a serializable inclusion proof that can be replayed
//!   without the tree.
//! - [`Piece`]: a ready-made [`Content`] for raw file pieces.
//!
//! Node digests are `H(left || right)`. A level with an odd number of nodes
//! is completed by a duplicate leaf at the leaf level and by pairing the
//! last node with itself above it.

#![warn(missing_docs)]

mod content;
mod error;
mod hash;
mod node;
mod proof;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;
mod tree;

pub use content::{Content, Piece};
pub use error::{BoxedError, Error, Result};
#[cfg(feature = "blake3")]
pub use hash::{Blake3Hasher, Blake3Strategy};
pub use hash::{Digest, HashStrategy, NodeHasher, Sha256Hasher, Sha256Strategy, node_digest};
pub use merkle_costs::{CostContext, CostResult, CostsExt, OperationCost};
pub use node::Leaf;
pub use proof::{MerkleProof, Side};
pub use tree::{AppendMode, MerkleTree};
