//! Inclusion proofs.
//!
//! A [`MerkleProof`] lists the sibling digests met while walking from a leaf
//! to the root, leaf level first, together with the side each sibling sits
//! on. Anyone holding the root, the content and the proof can replay it with
//! the tree's hash strategy; the tree itself is not needed.

use bincode::{Decode, Encode};

use crate::{Content, Digest, Error, HashStrategy, Result, node_digest};

/// Position of a sibling digest relative to the node being lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
#[repr(u8)]
pub enum Side {
    /// The sibling is the left child; the path node was the right child.
    Left = 0,
    /// The sibling is the right child. Self-paired nodes report this side
    /// with their own digest as the sibling.
    Right = 1,
}

impl Side {
    /// Numeric marker: `0` for left, `1` for right.
    pub fn marker(self) -> u8 {
        self as u8
    }
}

/// Ordered sibling digests and side markers from a leaf up to the root.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MerkleProof {
    siblings: Vec<Digest>,
    sides: Vec<Side>,
}

impl MerkleProof {
    /// Assemble a proof. Both sequences must have the same length.
    pub fn new(siblings: Vec<Digest>, sides: Vec<Side>) -> Result<Self> {
        if siblings.len() != sides.len() {
            return Err(Error::InvalidProof(format!(
                "{} sibling digests but {} side markers",
                siblings.len(),
                sides.len()
            )));
        }
        Ok(MerkleProof { siblings, sides })
    }

    /// Sibling digests, leaf level first.
    pub fn siblings(&self) -> &[Digest] {
        &self.siblings
    }

    /// Sibling sides, aligned with [`siblings`](Self::siblings).
    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Sides as `0`/`1` markers.
    pub fn side_markers(&self) -> Vec<u8> {
        self.sides.iter().map(|side| side.marker()).collect()
    }

    /// Number of levels between the leaf and the root.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// True for the proof of a tree whose root is a leaf. Trees built here
    /// never produce one.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Replay the path starting from `leaf_digest`.
    pub fn calculate_root<H: HashStrategy>(&self, leaf_digest: &[u8], strategy: &H) -> Result<Digest> {
        let mut current = leaf_digest.to_vec();
        for (sibling, side) in self.siblings.iter().zip(&self.sides) {
            current = match side {
                Side::Left => node_digest(strategy, sibling, &current)?,
                Side::Right => node_digest(strategy, &current, sibling)?,
            };
        }
        Ok(current)
    }

    /// Check that `content` is included under `root`.
    pub fn verify<C: Content, H: HashStrategy>(
        &self,
        root: &[u8],
        content: &C,
        strategy: &H,
    ) -> Result<bool> {
        let leaf_digest = content
            .calculate_hash()
            .map_err(|e| Error::ContentHash(Box::new(e)))?;
        Ok(self.calculate_root(&leaf_digest, strategy)? == root)
    }

    /// Serialize this proof to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| Error::InvalidData(format!("failed to encode MerkleProof: {}", e)))
    }

    /// Deserialize a proof from bytes.
    ///
    /// The bincode size limit is capped at 100 MiB to prevent
    /// crafted length headers from causing huge allocations.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 100 * 1024 * 1024 }>();
        let (proof, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| Error::InvalidData(format!("failed to decode MerkleProof: {}", e)))?;
        Self::new(proof.siblings, proof.sides)
    }
}
