//! The Merkle tree.

mod append;
mod build;
mod query;
mod verify;

use std::fmt;

use log::trace;
use merkle_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};

use crate::{
    Content, Digest, Error, HashStrategy, Leaf, Result, Sha256Strategy,
    hash::costed_node_digest,
    node::{Arena, NodeId, NodeKind},
};

/// Which incremental append algorithm a tree is committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppendMode {
    /// [`MerkleTree::append`]: odd levels are self-paired, no padding leaf
    /// is created.
    ImplicitDuplicate,
    /// [`MerkleTree::append_with_duplicate`]: an odd leaf count is padded
    /// with a duplicate leaf, keeping the shape of a fresh build.
    ExplicitDuplicate,
}

impl fmt::Display for AppendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppendMode::ImplicitDuplicate => f.write_str("implicit-duplicate"),
            AppendMode::ExplicitDuplicate => f.write_str("explicit-duplicate"),
        }
    }
}

/// A binary Merkle tree over an ordered list of content items.
///
/// Create one with [`build`](Self::build) (or
/// [`build_with_strategy`](Self::build_with_strategy)) from a batch, or start
/// empty with [`new`](Self::new) and grow it with
/// [`append_with_duplicate`](Self::append_with_duplicate). A tree commits to
/// one append algorithm on its first append; calling the other one returns
/// [`Error::AppendModeMismatch`].
///
/// Every operation returns its [`OperationCost`] alongside the result.
///
/// The tree is single-writer: appends and rebuilds take `&mut self`, reads
/// take `&self` and may run concurrently.
#[derive(Debug, Clone)]
pub struct MerkleTree<C, H = Sha256Strategy> {
    arena: Arena<C>,
    /// Leaf ids in insertion order, duplicates included.
    leaves: Vec<NodeId>,
    root: Option<NodeId>,
    /// Root digest as of the last successful mutation.
    merkle_root: Option<Digest>,
    strategy: H,
    append_mode: Option<AppendMode>,
}

impl<C: Content, H: HashStrategy + Default> Default for MerkleTree<C, H> {
    fn default() -> Self {
        Self::with_strategy(H::default())
    }
}

impl<C: Content, H: HashStrategy + Default> MerkleTree<C, H> {
    /// Empty tree with the default hash strategy.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Content, H: HashStrategy> MerkleTree<C, H> {
    /// Empty tree hashing with `strategy`.
    pub fn with_strategy(strategy: H) -> Self {
        MerkleTree {
            arena: Arena::default(),
            leaves: Vec::new(),
            root: None,
            merkle_root: None,
            strategy,
            append_mode: None,
        }
    }

    /// Commit the tree to `mode` up front instead of on the first append.
    pub fn with_append_mode(mut self, mode: AppendMode) -> Self {
        self.append_mode = Some(mode);
        self
    }

    /// Cached root digest; not recomputed. `None` for an empty tree.
    pub fn merkle_root(&self) -> Option<&[u8]> {
        self.merkle_root.as_deref()
    }

    /// Number of leaves, duplicates included.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of real content items.
    pub fn content_count(&self) -> usize {
        self.leaves
            .iter()
            .filter(|id| !self.arena[**id].is_duplicate())
            .count()
    }

    /// True if the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> impl Iterator<Item = Leaf<'_, C>> + '_ {
        self.leaves.iter().filter_map(|id| {
            let node = &self.arena[*id];
            node.content().map(|content| Leaf {
                content,
                digest: &node.digest,
                duplicate: node.is_duplicate(),
            })
        })
    }

    /// Number of edges between a leaf and the root.
    pub fn height(&self) -> usize {
        self.leaves
            .first()
            .map_or(0, |leaf| self.ancestors(*leaf).count())
    }

    /// Append mode the tree is committed to, if any.
    pub fn append_mode(&self) -> Option<AppendMode> {
        self.append_mode
    }

    /// Hash strategy used by every node.
    pub fn strategy(&self) -> &H {
        &self.strategy
    }

    /// Mutable access to the content of leaf `index`.
    ///
    /// Cached digests are left as they are, so a change shows up in
    /// [`verify_tree`](Self::verify_tree) until the tree is rebuilt.
    pub fn content_mut(&mut self, index: usize) -> Option<&mut C> {
        let id = *self.leaves.get(index)?;
        match &mut self.arena[id].kind {
            NodeKind::Leaf { content, .. } => Some(content),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Walk parent links from `id` up to the root, excluding `id`.
    pub(crate) fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.arena[id].parent, move |p| self.arena[*p].parent)
    }

    /// Fail if the tree is committed to the other append algorithm.
    fn check_append_mode(&self, requested: AppendMode) -> Result<()> {
        match self.append_mode {
            Some(locked) if locked != requested => {
                Err(Error::AppendModeMismatch { locked, requested })
            }
            _ => Ok(()),
        }
    }

    /// Digests the ancestors of `node` would get if its own digest became
    /// `digest`, root last. Nothing is written.
    fn rehash_path(&self, node: NodeId, digest: Digest) -> CostResult<Vec<Digest>, Error> {
        let mut cost = OperationCost::default();
        let mut path = Vec::new();
        let mut current = node;
        let mut current_digest = digest;
        for parent in self.ancestors(node) {
            let Some((left, right)) = self.arena[parent].children() else {
                return Err(Error::InconsistentTree(
                    "parent of a node is a leaf".to_string(),
                ))
                .wrap_with_cost(cost);
            };
            let left_digest = if left == current {
                &current_digest
            } else {
                &self.arena[left].digest
            };
            let right_digest = if right == current {
                &current_digest
            } else {
                &self.arena[right].digest
            };
            let digest = cost_return_on_error!(
                &mut cost,
                costed_node_digest(&self.strategy, left_digest, right_digest)
            );
            path.push(digest.clone());
            current_digest = digest;
            current = parent;
        }
        Ok(path).wrap_with_cost(cost)
    }

    /// Store `digests` on the ancestors of `node`, bottom-up, and cache the
    /// last one as the root digest.
    fn write_path(&mut self, node: NodeId, digests: Vec<Digest>) -> Result<()> {
        let ancestors: Vec<NodeId> = self.ancestors(node).collect();
        if ancestors.len() != digests.len() || ancestors.last().copied() != self.root {
            return Err(Error::InconsistentTree(format!(
                "{} ancestors for {} digests",
                ancestors.len(),
                digests.len()
            )));
        }
        for (id, digest) in ancestors.into_iter().zip(digests) {
            self.arena[id].digest = digest;
        }
        self.merkle_root = self.root.map(|root| self.arena[root].digest.clone());
        trace!("updated {} ancestors", self.height());
        Ok(())
    }
}

impl<C: fmt::Debug, H> fmt::Display for MerkleTree<C, H> {
    /// One line per leaf: leaf flag, duplicate flag, hex digest, content.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in &self.leaves {
            let node = &self.arena[*id];
            if let Some(content) = node.content() {
                writeln!(
                    f,
                    "{} {} {} {:?}",
                    node.is_leaf(),
                    node.is_duplicate(),
                    hex::encode(&node.digest),
                    content
                )?;
            }
        }
        Ok(())
    }
}
