//! Incremental appends.
//!
//! Both algorithms touch one node per level: the new leaf is attached next to
//! the rightmost node of each level and only the ancestors of the new leaf are
//! rehashed. All digests of the new path are computed before the tree is
//! changed, so a failing append leaves the tree as it was.

use log::{debug, trace};
use merkle_costs::{
    CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add,
};

use super::{AppendMode, MerkleTree};
use crate::{
    Content, Digest, Error, HashStrategy, Result,
    content::content_digest,
    hash::costed_node_digest,
    node::{Node, NodeId, NodeKind},
};

impl<C: Content, H: HashStrategy> MerkleTree<C, H> {
    /// Append `content` without materializing padding leaves.
    ///
    /// Needs a non-empty tree, otherwise returns [`Error::EmptyTree`]. The
    /// leaf sequence gains exactly one leaf, placed after the current last
    /// leaf (a padding duplicate left by the build included). It is attached
    /// as the right sibling of the rightmost node, lone nodes on the way up
    /// are self-paired, and a new root is created when the old one is full.
    /// On a tree built from an even number of items the root equals the root
    /// of a rebuild over the same contents.
    ///
    /// Costs one content hash and one node hash per level.
    pub fn append(&mut self, content: C) -> CostResult<(), Error> {
        let mut cost = OperationCost::default();
        cost_return_on_error_no_add!(
            cost,
            self.check_append_mode(AppendMode::ImplicitDuplicate)
        );
        let Some(&last) = self.leaves.last() else {
            return Err(Error::EmptyTree).wrap_with_cost(cost);
        };

        if self.leaves.len() < 2 {
            debug!(
                "append on a tree with {} leaves, rebuilding",
                self.leaves.len()
            );
            let mut contents: Vec<C> = self
                .leaves()
                .filter(|leaf| !leaf.duplicate)
                .map(|leaf| leaf.content.clone())
                .collect();
            contents.push(content);
            cost_return_on_error!(&mut cost, self.rebuild_with(contents));
        } else {
            let digest = cost_return_on_error!(&mut cost, content_digest(&content));
            let count = self.leaves.len();
            let path = cost_return_on_error!(
                &mut cost,
                self.rehash_attach(digest.clone(), last, count)
            );

            let leaf = self.arena.push(Node::leaf(content, digest, false));
            self.leaves.push(leaf);
            cost_return_on_error_no_add!(cost, self.attach_rightmost(leaf, last, count));
            cost_return_on_error_no_add!(cost, self.write_path(leaf, path));
        }

        self.append_mode = Some(AppendMode::ImplicitDuplicate);
        trace!(
            "implicit-duplicate append: {} leaves, {} node hashes",
            self.leaves.len(),
            cost.hash_node_calls
        );
        Ok(()).wrap_with_cost(cost)
    }

    /// Append `content` keeping the padded shape of a fresh build.
    ///
    /// Works on an empty tree. After every call the tree is identical to a
    /// rebuild over the same contents: an odd content count ends with a
    /// duplicate leaf, which the next append replaces in place.
    pub fn append_with_duplicate(&mut self, content: C) -> CostResult<(), Error> {
        let mut cost = OperationCost::default();
        cost_return_on_error_no_add!(
            cost,
            self.check_append_mode(AppendMode::ExplicitDuplicate)
        );
        let digest = cost_return_on_error!(&mut cost, content_digest(&content));

        match self.leaves.last().copied() {
            None => {
                let root_digest = cost_return_on_error!(
                    &mut cost,
                    costed_node_digest(&self.strategy, &digest, &digest)
                );
                let leaf = self.push_leaf_pair(content, digest);
                let root = self.arena.push_parent(leaf, self.leaves[1]);
                self.root = Some(root);
                cost_return_on_error_no_add!(cost, self.write_path(leaf, vec![root_digest]));
            }
            Some(last) if self.arena[last].is_duplicate() => {
                let path = cost_return_on_error!(&mut cost, self.rehash_path(last, digest.clone()));
                let node = &mut self.arena[last];
                node.kind = NodeKind::Leaf {
                    content,
                    duplicate: false,
                };
                node.digest = digest;
                cost_return_on_error_no_add!(cost, self.write_path(last, path));
            }
            Some(last) => {
                let Some(last_parent) = self.arena[last].parent else {
                    return Err(Error::InconsistentTree(
                        "leaf without parent".to_string(),
                    ))
                    .wrap_with_cost(cost);
                };
                let count = self.leaves.len();
                let pair_digest = cost_return_on_error!(
                    &mut cost,
                    costed_node_digest(&self.strategy, &digest, &digest)
                );
                let upper = cost_return_on_error!(
                    &mut cost,
                    self.rehash_attach(pair_digest.clone(), last_parent, count / 2)
                );
                let mut path = Vec::with_capacity(upper.len() + 1);
                path.push(pair_digest);
                path.extend(upper);

                let leaf = self.push_leaf_pair(content, digest);
                let pair = self.arena.push_parent(leaf, self.leaves[count + 1]);
                cost_return_on_error_no_add!(cost, self.attach_rightmost(pair, last_parent, count / 2));
                cost_return_on_error_no_add!(cost, self.write_path(leaf, path));
            }
        }

        self.append_mode = Some(AppendMode::ExplicitDuplicate);
        trace!(
            "explicit-duplicate append: {} leaves, {} node hashes",
            self.leaves.len(),
            cost.hash_node_calls
        );
        Ok(()).wrap_with_cost(cost)
    }

    /// Push a real leaf and its duplicate, returning the real one.
    fn push_leaf_pair(&mut self, content: C, digest: Digest) -> NodeId {
        let duplicate = self
            .arena
            .push(Node::leaf(content.clone(), digest.clone(), true));
        let leaf = self.arena.push(Node::leaf(content, digest, false));
        self.leaves.push(leaf);
        self.leaves.push(duplicate);
        leaf
    }

    /// Digests of the nodes above a new rightmost node with `digest`, as
    /// [`attach_rightmost`](Self::attach_rightmost) will link it next to
    /// `last` on a level of `count` nodes. Bottom-up, root last.
    fn rehash_attach(
        &self,
        mut digest: Digest,
        mut last: NodeId,
        mut count: usize,
    ) -> CostResult<Vec<Digest>, Error> {
        let mut cost = OperationCost::default();
        let mut path = Vec::new();
        loop {
            if count == 0 {
                return Err(Error::InconsistentTree("empty level".to_string())).wrap_with_cost(cost);
            }
            if count == 1 {
                if self.root != Some(last) {
                    return Err(Error::InconsistentTree(
                        "lone node of a level is not the root".to_string(),
                    ))
                    .wrap_with_cost(cost);
                }
                let root_digest = cost_return_on_error!(
                    &mut cost,
                    costed_node_digest(&self.strategy, &self.arena[last].digest, &digest)
                );
                path.push(root_digest);
                return Ok(path).wrap_with_cost(cost);
            }

            let Some(parent) = self.arena[last].parent else {
                return Err(Error::InconsistentTree(
                    "non-root node without parent".to_string(),
                ))
                .wrap_with_cost(cost);
            };
            if count % 2 == 1 {
                if self.arena[parent].children() != Some((last, last)) {
                    return Err(Error::InconsistentTree(
                        "last node of an odd level is not self-paired".to_string(),
                    ))
                    .wrap_with_cost(cost);
                }
                let parent_digest = cost_return_on_error!(
                    &mut cost,
                    costed_node_digest(&self.strategy, &self.arena[last].digest, &digest)
                );
                path.push(parent_digest.clone());
                let upper = cost_return_on_error!(&mut cost, self.rehash_path(parent, parent_digest));
                path.extend(upper);
                return Ok(path).wrap_with_cost(cost);
            }

            digest = cost_return_on_error!(
                &mut cost,
                costed_node_digest(&self.strategy, &digest, &digest)
            );
            path.push(digest.clone());
            last = parent;
            count /= 2;
        }
    }

    /// Hook `node` in as the new rightmost node of a level that held `count`
    /// nodes ending with `last`.
    ///
    /// Only links are changed; digests come from
    /// [`rehash_attach`](Self::rehash_attach), which checks the same shape
    /// beforehand.
    fn attach_rightmost(&mut self, mut node: NodeId, mut last: NodeId, mut count: usize) -> Result<()> {
        loop {
            if count <= 1 {
                if count == 0 || self.root != Some(last) {
                    return Err(Error::InconsistentTree(
                        "lone node of a level is not the root".to_string(),
                    ));
                }
                let root = self.arena.push_parent(last, node);
                self.root = Some(root);
                debug!("new root over {} leaves", self.leaves.len());
                return Ok(());
            }

            let Some(parent) = self.arena[last].parent else {
                return Err(Error::InconsistentTree(
                    "non-root node without parent".to_string(),
                ));
            };
            if count % 2 == 1 {
                // `last` is self-paired; `node` completes the pair.
                self.arena.set_right(parent, node);
                return Ok(());
            }

            node = self.arena.push_parent(node, node);
            last = parent;
            count /= 2;
        }
    }
}
