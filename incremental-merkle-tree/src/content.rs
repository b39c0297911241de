//! The capability set an item must provide to be stored in the tree.

use std::convert::Infallible;

use merkle_costs::{CostResult, CostsExt, OperationCost};
use sha2::Digest as _;

use crate::{Digest, Error};

/// An item stored and verified by the tree.
///
/// The tree never looks inside an item; it only asks for its digest and
/// compares it against other items. `Clone` is needed because padding an odd
/// leaf count stores a duplicate of the last item, and rebuilds re-derive the
/// tree from the stored items.
///
/// The digest must be produced with the same algorithm as the tree's
/// [`HashStrategy`](crate::HashStrategy), otherwise proofs cannot be replayed
/// by third parties.
pub trait Content: Clone {
    /// Error reported by the digest and equality functions.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deterministic, side-effect-free digest of the item.
    fn calculate_hash(&self) -> Result<Digest, Self::Error>;

    /// Whether `self` and `other` denote the same item.
    fn equals(&self, other: &Self) -> Result<bool, Self::Error>;
}

/// Hash `content`, counting one content hash call.
pub(crate) fn content_digest<C: Content>(content: &C) -> CostResult<Digest, Error> {
    content
        .calculate_hash()
        .map_err(|e| Error::ContentHash(Box::new(e)))
        .wrap_with_cost(OperationCost::with_content_hash_calls(1))
}

/// Compare two items, counting one equality check.
pub(crate) fn content_equals<C: Content>(stored: &C, query: &C) -> CostResult<bool, Error> {
    stored
        .equals(query)
        .map_err(|e| Error::ContentEquality(Box::new(e)))
        .wrap_with_cost(OperationCost::with_equality_checks(1))
}

/// A raw piece of a distributed file, identified by its SHA-256 digest.
///
/// Pairs with the default [`Sha256Strategy`](crate::Sha256Strategy).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece(Vec<u8>);

impl Piece {
    /// Wrap piece bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Piece(data.into())
    }

    /// The piece bytes.
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    /// Replace the piece bytes in place.
    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.0 = data.into();
    }
}

impl Content for Piece {
    type Error = Infallible;

    fn calculate_hash(&self) -> Result<Digest, Self::Error> {
        Ok(sha2::Sha256::digest(&self.0).to_vec())
    }

    fn equals(&self, other: &Self) -> Result<bool, Self::Error> {
        Ok(self == other)
    }
}
