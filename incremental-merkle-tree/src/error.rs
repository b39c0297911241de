use thiserror::Error;

use crate::AppendMode;

/// Error type produced by content implementations, carried verbatim.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors from Merkle tree operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Tried to build or rebuild a tree from zero content items.
    #[error("cannot construct tree with no content")]
    EmptyInput,
    /// Tried an operation that needs at least one leaf on an empty tree.
    #[error("tree has no leaves")]
    EmptyTree,
    /// The content's digest function failed.
    #[error("content hash failed: {0}")]
    ContentHash(#[source] BoxedError),
    /// The content's equality check failed during a lookup.
    #[error("content equality check failed: {0}")]
    ContentEquality(#[source] BoxedError),
    /// The hash strategy refused its input.
    #[error("hash write failed: {0}")]
    HashWrite(String),
    /// The tree already committed to the other append strategy.
    #[error("tree is committed to {locked} appends, got {requested} append")]
    AppendModeMismatch {
        /// Mode the tree was locked to by its first append.
        locked: AppendMode,
        /// Mode of the rejected call.
        requested: AppendMode,
    },
    /// Parent/child links do not form a valid tree.
    #[error("inconsistent tree: {0}")]
    InconsistentTree(String),
    /// Malformed proof.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    /// Undecodable bytes.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
