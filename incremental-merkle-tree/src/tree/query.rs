//! Leaf lookup and inclusion proofs.

use merkle_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};

use super::MerkleTree;
use crate::{
    Content, Error, HashStrategy, MerkleProof, Side,
    content::content_equals,
    node::NodeId,
};

impl<C: Content, H: HashStrategy> MerkleTree<C, H> {
    /// First leaf, in leaf order, whose content equals `content`.
    pub(super) fn find_leaf(&self, content: &C) -> CostResult<Option<NodeId>, Error> {
        let mut cost = OperationCost::default();
        for id in &self.leaves {
            let Some(stored) = self.arena[*id].content() else {
                continue;
            };
            if cost_return_on_error!(&mut cost, content_equals(stored, content)) {
                return Ok(Some(*id)).wrap_with_cost(cost);
            }
        }
        Ok(None).wrap_with_cost(cost)
    }

    /// Inclusion proof for the first leaf holding `content`.
    ///
    /// Returns `Ok(None)` if no leaf matches. Equality errors abort the
    /// search.
    pub fn get_merkle_path(&self, content: &C) -> CostResult<Option<MerkleProof>, Error> {
        let mut cost = OperationCost::default();
        let found = cost_return_on_error!(&mut cost, self.find_leaf(content));
        let Some(leaf) = found else {
            return Ok(None).wrap_with_cost(cost);
        };

        let mut siblings = Vec::new();
        let mut sides = Vec::new();
        let mut current = leaf;
        for parent in self.ancestors(leaf) {
            let Some((left, right)) = self.arena[parent].children() else {
                return Err(Error::InconsistentTree(
                    "parent of a node is a leaf".to_string(),
                ))
                .wrap_with_cost(cost);
            };
            if left == current {
                siblings.push(self.arena[right].digest.clone());
                sides.push(Side::Right);
            } else {
                siblings.push(self.arena[left].digest.clone());
                sides.push(Side::Left);
            }
            current = parent;
        }

        MerkleProof::new(siblings, sides)
            .map(Some)
            .wrap_with_cost(cost)
    }
}
