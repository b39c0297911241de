//! Node storage.
//!
//! Nodes live in an [`Arena`] owned by the tree and refer to each other by
//! [`NodeId`]. A self-paired node has the same id in both child slots.

use std::ops::{Index, IndexMut};

use crate::Digest;

/// Stable handle of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind<C> {
    Leaf { content: C, duplicate: bool },
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone)]
pub(crate) struct Node<C> {
    pub(crate) digest: Digest,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind<C>,
}

impl<C> Node<C> {
    pub(crate) fn leaf(content: C, digest: Digest, duplicate: bool) -> Self {
        Node {
            digest,
            parent: None,
            kind: NodeKind::Leaf { content, duplicate },
        }
    }

    /// Internal node with a placeholder digest, filled in by the caller.
    pub(crate) fn internal(left: NodeId, right: NodeId) -> Self {
        Node {
            digest: Digest::new(),
            parent: None,
            kind: NodeKind::Internal { left, right },
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub(crate) fn is_duplicate(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { duplicate: true, .. })
    }

    pub(crate) fn content(&self) -> Option<&C> {
        match &self.kind {
            NodeKind::Leaf { content, .. } => Some(content),
            NodeKind::Internal { .. } => None,
        }
    }

    pub(crate) fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<C> {
    nodes: Vec<Node<C>>,
}

impl<C> Default for Arena<C> {
    fn default() -> Self {
        Arena { nodes: Vec::new() }
    }
}

impl<C> Arena<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, node: Node<C>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Push an internal node over `left` and `right` and point both children
    /// at it.
    pub(crate) fn push_parent(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let parent = self.push(Node::internal(left, right));
        self[left].parent = Some(parent);
        self[right].parent = Some(parent);
        parent
    }

    /// Replace the right child of `parent` with `child`.
    pub(crate) fn set_right(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Internal { right, .. } = &mut self[parent].kind {
            *right = child;
        }
        self[child].parent = Some(parent);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl<C> Index<NodeId> for Arena<C> {
    type Output = Node<C>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<C> IndexMut<NodeId> for Arena<C> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

/// Read-only view of one leaf, in leaf order.
#[derive(Debug, Clone)]
pub struct Leaf<'a, C> {
    /// Stored content.
    pub content: &'a C,
    /// Cached digest, as computed at insertion or the last rebuild.
    pub digest: &'a [u8],
    /// Whether this leaf is padding copied from the previous real leaf.
    pub duplicate: bool,
}
