//! Batch construction and rebuilds.

use log::debug;
use merkle_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};

use super::MerkleTree;
use crate::{
    Content, Error, HashStrategy,
    content::content_digest,
    hash::costed_node_digest,
    node::{Arena, Node, NodeId},
};

/// Freshly built nodes, installed into a tree only once complete.
pub(super) struct Layout<C> {
    pub(super) arena: Arena<C>,
    pub(super) leaves: Vec<NodeId>,
    pub(super) root: NodeId,
}

impl<C: Content, H: HashStrategy + Default> MerkleTree<C, H> {
    /// Build a tree from `contents` with the default hash strategy.
    ///
    /// Returns [`Error::EmptyInput`] if `contents` is empty. The first failing
    /// content hash aborts the build.
    pub fn build(contents: impl IntoIterator<Item = C>) -> CostResult<Self, Error> {
        Self::build_with_strategy(contents, H::default())
    }
}

impl<C: Content, H: HashStrategy> MerkleTree<C, H> {
    /// Build a tree from `contents`, hashing nodes with `strategy`.
    pub fn build_with_strategy(
        contents: impl IntoIterator<Item = C>,
        strategy: H,
    ) -> CostResult<Self, Error> {
        let mut cost = OperationCost::default();
        let layout = cost_return_on_error!(
            &mut cost,
            build_layout(contents.into_iter().collect(), &strategy)
        );
        let mut tree = Self::with_strategy(strategy);
        tree.install(layout);
        Ok(tree).wrap_with_cost(cost)
    }

    /// Rebuild the whole tree from the current real contents.
    ///
    /// Internal and duplicate nodes are discarded and derived again, which
    /// also refreshes digests of contents changed through
    /// [`content_mut`](Self::content_mut).
    pub fn rebuild(&mut self) -> CostResult<(), Error> {
        let contents: Vec<C> = self
            .leaves()
            .filter(|leaf| !leaf.duplicate)
            .map(|leaf| leaf.content.clone())
            .collect();
        self.rebuild_with(contents)
    }

    /// Replace the content list and rebuild the tree.
    ///
    /// On failure the tree is left untouched. The committed append mode, if
    /// any, is kept.
    pub fn rebuild_with(&mut self, contents: impl IntoIterator<Item = C>) -> CostResult<(), Error> {
        let mut cost = OperationCost::default();
        let layout = cost_return_on_error!(
            &mut cost,
            build_layout(contents.into_iter().collect(), &self.strategy)
        );
        debug!(
            "rebuilt tree: {} leaves replaced by {}",
            self.leaves.len(),
            layout.leaves.len()
        );
        self.install(layout);
        Ok(()).wrap_with_cost(cost)
    }

    pub(super) fn install(&mut self, layout: Layout<C>) {
        self.merkle_root = Some(layout.arena[layout.root].digest.clone());
        self.arena = layout.arena;
        self.leaves = layout.leaves;
        self.root = Some(layout.root);
    }
}

/// Hash `contents` into leaves, pad an odd count with a duplicate of the last
/// leaf, then pair levels up to a single root.
pub(super) fn build_layout<C: Content, H: HashStrategy>(
    contents: Vec<C>,
    strategy: &H,
) -> CostResult<Layout<C>, Error> {
    let mut cost = OperationCost::default();
    if contents.is_empty() {
        return Err(Error::EmptyInput).wrap_with_cost(cost);
    }

    let padded = contents.len() + contents.len() % 2;
    let mut arena = Arena::with_capacity(2 * padded);
    let mut leaves = Vec::with_capacity(padded);
    for content in contents {
        let digest = cost_return_on_error!(&mut cost, content_digest(&content));
        leaves.push(arena.push(Node::leaf(content, digest, false)));
    }
    if leaves.len() % 2 == 1 {
        let node = &arena[leaves[leaves.len() - 1]];
        let duplicate = match node.content() {
            Some(content) => Node::leaf(content.clone(), node.digest.clone(), true),
            None => {
                return Err(Error::InconsistentTree("leaf without content".to_string()))
                    .wrap_with_cost(cost);
            }
        };
        leaves.push(arena.push(duplicate));
    }

    let root = cost_return_on_error!(&mut cost, build_levels(&mut arena, leaves.clone(), strategy));
    debug!(
        "built tree over {} leaves with {} node hashes",
        leaves.len(),
        cost.hash_node_calls
    );
    Ok(Layout {
        arena,
        leaves,
        root,
    })
    .wrap_with_cost(cost)
}

/// Pair adjacent nodes level by level. A lone last node is paired with
/// itself.
fn build_levels<C, H: HashStrategy>(
    arena: &mut Arena<C>,
    mut level: Vec<NodeId>,
    strategy: &H,
) -> CostResult<NodeId, Error> {
    let mut cost = OperationCost::default();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let left = pair[0];
            let right = pair.get(1).copied().unwrap_or(left);
            let digest = cost_return_on_error!(
                &mut cost,
                costed_node_digest(strategy, &arena[left].digest, &arena[right].digest)
            );
            let parent = arena.push_parent(left, right);
            arena[parent].digest = digest;
            next.push(parent);
        }
        level = next;
    }
    match level.first() {
        Some(root) => Ok(*root).wrap_with_cost(cost),
        None => Err(Error::EmptyInput).wrap_with_cost(cost),
    }
}
