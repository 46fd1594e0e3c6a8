use thiserror::Error;

use crate::node::{NodeId, NodeKind};

/// Structural violations reported by tree mutations.
///
/// A rejected mutation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The handle does not name a node of this tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),

    /// [§ 4.2.3](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    /// "If parent is not a Document, DocumentFragment, or Element node, then
    /// throw a "HierarchyRequestError" DOMException."
    #[error("{kind} node {parent:?} cannot have children")]
    CannotHaveChildren {
        /// The rejected parent.
        parent: NodeId,
        /// Its node type.
        kind: NodeKind,
    },

    /// "If node is a host-including inclusive ancestor of parent, then throw
    /// a "HierarchyRequestError" DOMException."
    #[error("inserting {node:?} into {parent:?} would make a node its own ancestor")]
    Cycle {
        /// The node being inserted.
        node: NodeId,
        /// The intended parent.
        parent: NodeId,
    },

    /// "If child is non-null and its parent is not parent, then throw a
    /// "NotFoundError" DOMException."
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The reference child.
        child: NodeId,
        /// The parent it was expected under.
        parent: NodeId,
    },

    /// "If node is not a DocumentFragment, DocumentType, Element, or
    /// CharacterData node, then throw a "HierarchyRequestError" DOMException."
    #[error("{0} nodes cannot be inserted into a tree")]
    InvalidChildKind(NodeKind),

    /// The node is already attached elsewhere; moving nodes between parents
    /// is not supported.
    #[error("{0:?} already has a parent")]
    AlreadyHasParent(NodeId),

    /// One of the document-specific pre-insertion rules.
    #[error("document cannot accept this child: {0}")]
    HierarchyRequest(&'static str),
}
