//! Arena-based DOM node model.
//!
//! This crate provides the subset of the
//! [DOM Living Standard](https://dom.spec.whatwg.org/) that HTML tree
//! construction needs: node variants, character data, and insertion.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! [`DomTree`] owns every node. Sibling order lives only in each parent's child
//! list, so it can never disagree with the parent links.

mod character_data;
mod error;
mod namespace;
mod node;
mod tree;

pub use character_data::CharacterData;
pub use error::DomError;
pub use namespace::Namespace;
pub use node::{
    AttrData, AttributesMap, DocumentTypeData, ElementData, Node, NodeId, NodeKind, NodeType,
    ProcessingInstructionData,
};
pub use tree::{AncestorIterator, DomTree, QuirksMode};
