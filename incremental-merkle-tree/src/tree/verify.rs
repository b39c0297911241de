//! Verification against live content.

use log::debug;
use merkle_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};

use super::MerkleTree;
use crate::{
    Content, Digest, Error, HashStrategy,
    content::content_digest,
    hash::costed_node_digest,
    node::{NodeId, NodeKind},
};

impl<C: Content, H: HashStrategy> MerkleTree<C, H> {
    /// Recompute the whole tree from the current contents and compare the
    /// result with the cached root digest.
    ///
    /// Returns [`Error::EmptyTree`] on an empty tree. Rehashes every leaf and
    /// every internal node.
    pub fn verify_tree(&self) -> CostResult<bool, Error> {
        let mut cost = OperationCost::default();
        let Some(root) = self.root else {
            return Err(Error::EmptyTree).wrap_with_cost(cost);
        };
        let recomputed = cost_return_on_error!(&mut cost, self.recompute_subtree(root));
        let matches = self.merkle_root.as_deref() == Some(recomputed.as_slice());
        if !matches {
            debug!(
                "tree verification failed: recomputed root {}",
                hex::encode(&recomputed)
            );
        }
        Ok(matches).wrap_with_cost(cost)
    }

    fn recompute_subtree(&self, id: NodeId) -> CostResult<Digest, Error> {
        let mut cost = OperationCost::default();
        let (left, right) = match &self.arena[id].kind {
            NodeKind::Leaf { content, .. } => return content_digest(content),
            NodeKind::Internal { left, right } => (*left, *right),
        };
        let left_digest = cost_return_on_error!(&mut cost, self.recompute_subtree(left));
        let right_digest = if right == left {
            left_digest.clone()
        } else {
            cost_return_on_error!(&mut cost, self.recompute_subtree(right))
        };
        costed_node_digest(&self.strategy, &left_digest, &right_digest).add_cost(cost)
    }

    /// Check the path of the first leaf holding `content`.
    ///
    /// Every ancestor is recomputed from its children, with leaf children
    /// rehashed from their content and internal children taken from cache,
    /// and compared with its cached digest. Subtrees off the path are
    /// trusted. Returns `Ok(false)` if no leaf holds `content`.
    pub fn verify_content(&self, content: &C) -> CostResult<bool, Error> {
        let mut cost = OperationCost::default();
        let found = cost_return_on_error!(&mut cost, self.find_leaf(content));
        let Some(leaf) = found else {
            return Ok(false).wrap_with_cost(cost);
        };

        for parent in self.ancestors(leaf) {
            let Some((left, right)) = self.arena[parent].children() else {
                return Err(Error::InconsistentTree(
                    "parent of a node is a leaf".to_string(),
                ))
                .wrap_with_cost(cost);
            };
            let left_digest = cost_return_on_error!(&mut cost, self.current_digest(left));
            let right_digest = if right == left {
                left_digest.clone()
            } else {
                cost_return_on_error!(&mut cost, self.current_digest(right))
            };
            let digest = cost_return_on_error!(
                &mut cost,
                costed_node_digest(&self.strategy, &left_digest, &right_digest)
            );
            if digest != self.arena[parent].digest {
                debug!("content verification failed below {}", hex::encode(&digest));
                return Ok(false).wrap_with_cost(cost);
            }
        }
        Ok(true).wrap_with_cost(cost)
    }

    /// Fresh digest for leaves, cached digest for internal nodes.
    fn current_digest(&self, id: NodeId) -> CostResult<Digest, Error> {
        match &self.arena[id].kind {
            NodeKind::Leaf { content, .. } => content_digest(content),
            NodeKind::Internal { .. } => {
                Ok(self.arena[id].digest.clone()).wrap_with_cost(OperationCost::default())
            }
        }
    }
}
