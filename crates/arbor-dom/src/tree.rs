use strum_macros::Display;

use crate::character_data::CharacterData;
use crate::error::DomError;
use crate::namespace::Namespace;
use crate::node::{DocumentTypeData, ElementData, Node, NodeId, NodeKind, NodeType};

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")". "Unless stated otherwise, a document's mode is
/// "no-quirks"."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum QuirksMode {
    /// "no-quirks"
    #[default]
    #[strum(serialize = "no-quirks")]
    NoQuirks,
    /// "quirks"
    #[strum(serialize = "quirks")]
    Quirks,
    /// "limited-quirks"
    #[strum(serialize = "limited-quirks")]
    LimitedQuirks,
}

/// Arena-based DOM tree with O(1) node access.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// The arena is the single owner of every node; everything else (the parser's
/// stack of open elements, element pointers) holds [`NodeId`] handles. Nodes
/// are allocated detached and only become part of the document once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,

    /// The document's mode, set by the parser from the doctype.
    quirks_mode: QuirksMode,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            quirks_mode: QuirksMode::NoQuirks,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (never true: the Document always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document's quirks mode.
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Set the document's quirks mode.
    pub const fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    // ===== Node creation =====

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// [§ 4.9 create an element](https://dom.spec.whatwg.org/#concept-create-element)
    ///
    /// Allocates a detached element with no attributes.
    pub fn create_element(&mut self, local_name: &str, namespace: Namespace) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(local_name, namespace)))
    }

    /// Allocates a detached Text node.
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(CharacterData::new(data)))
    }

    /// Allocates a detached Comment node.
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(CharacterData::new(data)))
    }

    /// Allocates a detached DocumentType node.
    pub fn create_document_type(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.alloc(NodeType::DocumentType(DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    /// Allocates an empty DocumentFragment.
    pub fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    // ===== Mutation =====

    /// [§ 4.2.3 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Errors
    ///
    /// Returns a [`DomError`] if the insertion would violate a tree invariant.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, DomError> {
        self.pre_insert(parent, node, None)
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// "To pre-insert a node into a parent before a child, run these steps:"
    ///
    /// # Errors
    ///
    /// Returns a [`DomError`] if pre-insertion validity does not hold.
    pub fn pre_insert(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        // STEP 1: "Ensure pre-insertion validity of node into parent before child."
        self.ensure_pre_insertion_validity(parent, node, child)?;

        // STEP 2: "Let referenceChild be child."
        // STEP 3: "If referenceChild is node, then set referenceChild to node's
        //          next sibling."
        // Validity already holds, so node is a child of parent here, and
        // inserting it before its own next sibling leaves the tree as it is.
        if child == Some(node) {
            return Ok(node);
        }

        // STEP 4: "Insert node into parent before referenceChild."
        self.insert(parent, node, child)?;

        // STEP 5: "Return node."
        Ok(node)
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// "To insert a node into a parent before a child, with an optional
    /// suppress observers flag, run these steps:"
    ///
    /// Mutation observers are not modelled, so there is no suppress
    /// observers flag. Unlike the DOM algorithm this refuses to move a node
    /// that is already attached.
    ///
    /// # Errors
    ///
    /// Returns a [`DomError`] for unknown handles, parents that cannot have
    /// children, cycles, non-insertable node kinds, a `child` that is not a
    /// child of `parent`, and nodes that already have a parent.
    pub fn insert(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check_structure(parent, node, child)?;
        if self.node(node)?.parent.is_some() {
            return Err(DomError::AlreadyHasParent(node));
        }

        // STEP 1: "Let nodes be node's children, if node is a DocumentFragment
        //          node; otherwise « node »."
        let is_fragment = self.node(node)?.node_type.is_fragment();
        let nodes = if is_fragment {
            self.nodes[node.0].children.clone()
        } else {
            vec![node]
        };

        // STEP 2-3: "Let count be nodes's size. If count is 0, then return."
        if nodes.is_empty() {
            return Ok(());
        }

        // STEP 4: "If node is a DocumentFragment node, then remove its children
        //          with the suppress observers flag set."
        if is_fragment {
            self.nodes[node.0].children.clear();
            for &n in &nodes {
                self.nodes[n.0].parent = None;
            }
        }

        // STEP 7: "For each node in nodes, in tree order:"
        //   "If child is null, then append node to parent's children."
        //   "Otherwise, insert node into parent's children before child's index."
        let index = match child {
            Some(reference) => self.index(reference).ok_or(DomError::NotAChild {
                child: reference,
                parent,
            })?,
            None => self.nodes[parent.0].children.len(),
        };
        let _ = self.nodes[parent.0]
            .children
            .splice(index..index, nodes.iter().copied());
        for &n in &nodes {
            self.nodes[n.0].parent = Some(parent);
        }

        Ok(())
    }

    /// [§ 4.2.3 Ensure pre-insertion validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    fn ensure_pre_insertion_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), DomError> {
        // STEP 1-4: parent kind, cycles, child's parent, node kind.
        self.check_structure(parent, node, child)?;

        let node_type = &self.node(node)?.node_type;
        let parent_is_document = matches!(self.node(parent)?.node_type, NodeType::Document);

        // STEP 5: "If either node is a Text node and parent is a document, or
        //          node is a doctype and parent is not a document, then throw a
        //          "HierarchyRequestError" DOMException."
        match node_type {
            NodeType::Text(_) if parent_is_document => {
                return Err(DomError::HierarchyRequest("text cannot be a child of a document"));
            }
            NodeType::DocumentType(_) if !parent_is_document => {
                return Err(DomError::HierarchyRequest(
                    "a doctype can only be a child of a document",
                ));
            }
            _ => {}
        }

        // STEP 6: "If parent is a document, and any of the statements below,
        //          switched on the interface node implements, are true, then
        //          throw a "HierarchyRequestError" DOMException."
        if !parent_is_document {
            return Ok(());
        }

        let element_children = |id: NodeId| {
            self.nodes[id.0]
                .children
                .iter()
                .filter(|&&c| self.nodes[c.0].kind() == NodeKind::Element)
                .count()
        };
        let parent_has_element_child = element_children(parent) > 0;
        let child_is_doctype = child.is_some_and(|c| self.nodes[c.0].kind() == NodeKind::DocumentType);
        let doctype_follows_child = child.is_some_and(|c| {
            self.following_siblings(c)
                .any(|s| self.nodes[s.0].kind() == NodeKind::DocumentType)
        });

        match node_type {
            // "DocumentFragment node: If node has more than one element child or
            //  has a Text node child. Otherwise, if node has one element child
            //  and either parent has an element child, child is a doctype, or
            //  child is non-null and a doctype is following child."
            NodeType::DocumentFragment | NodeType::ShadowRoot => {
                let has_text = self.nodes[node.0]
                    .children
                    .iter()
                    .any(|&c| self.nodes[c.0].kind() == NodeKind::Text);
                let elements = element_children(node);
                if elements > 1 || has_text {
                    return Err(DomError::HierarchyRequest(
                        "fragment must hold at most one element and no text",
                    ));
                }
                if elements == 1
                    && (parent_has_element_child || child_is_doctype || doctype_follows_child)
                {
                    return Err(DomError::HierarchyRequest(
                        "a document can only have one document element",
                    ));
                }
            }
            // "Element: parent has an element child, child is a doctype, or child
            //  is non-null and a doctype is following child."
            NodeType::Element(_) => {
                if parent_has_element_child {
                    return Err(DomError::HierarchyRequest(
                        "a document can only have one document element",
                    ));
                }
                if child_is_doctype || doctype_follows_child {
                    return Err(DomError::HierarchyRequest(
                        "the document element must follow the doctype",
                    ));
                }
            }
            // "DocumentType: parent has a doctype child, child is non-null and
            //  an element is preceding child, or child is null and parent has an
            //  element child."
            NodeType::DocumentType(_) => {
                let parent_has_doctype = self.nodes[parent.0]
                    .children
                    .iter()
                    .any(|&c| self.nodes[c.0].kind() == NodeKind::DocumentType);
                if parent_has_doctype {
                    return Err(DomError::HierarchyRequest(
                        "a document can only have one doctype",
                    ));
                }
                let element_precedes_child = child.is_some_and(|c| {
                    self.preceding_siblings(c)
                        .any(|s| self.nodes[s.0].kind() == NodeKind::Element)
                });
                if element_precedes_child || (child.is_none() && parent_has_element_child) {
                    return Err(DomError::HierarchyRequest(
                        "the doctype must precede the document element",
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Checks shared by `insert` and `pre_insert`: the handles exist, parent
    /// can have children, node is insertable, no cycle is formed, and `child`
    /// is a child of `parent`.
    fn check_structure(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        let inserted = self.node(node)?;

        // "If parent is not a Document, DocumentFragment, or Element node..."
        if !parent_node.node_type.can_have_children() {
            return Err(DomError::CannotHaveChildren {
                parent,
                kind: parent_node.kind(),
            });
        }

        // "If node is a host-including inclusive ancestor of parent..."
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::Cycle { node, parent });
        }

        // "If child is non-null and its parent is not parent..."
        if let Some(child) = child
            && self.node(child)?.parent != Some(parent)
        {
            return Err(DomError::NotAChild { child, parent });
        }

        // "If node is not a DocumentFragment, DocumentType, Element, or
        //  CharacterData node..."
        match inserted.node_type {
            NodeType::Document | NodeType::Attr(_) => {
                Err(DomError::InvalidChildKind(inserted.kind()))
            }
            _ => Ok(()),
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    // ===== Traversal =====

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-haschildnodes)
    ///
    /// "The hasChildNodes() method steps are to return true if this has
    /// children; otherwise false."
    #[must_use]
    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-index)
    ///
    /// "The index of an object is its number of preceding siblings, or 0 if
    /// it has none." Returns `None` for detached nodes.
    #[must_use]
    pub fn index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    ///
    /// "The previous sibling of an object is its first preceding sibling or
    /// null if it has no preceding sibling."
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index(id)?.checked_sub(1)?;
        self.children(self.parent(id)?).get(index).copied()
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    ///
    /// "The next sibling of an object is its first following sibling or null
    /// if it has no following sibling."
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index(id)?;
        self.children(self.parent(id)?).get(index + 1).copied()
    }

    /// Siblings after `id`, nearest first.
    pub fn following_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings: &[NodeId] = match (self.parent(id), self.index(id)) {
            (Some(parent), Some(index)) => &self.children(parent)[index + 1..],
            _ => &[],
        };
        siblings.iter().copied()
    }

    /// Siblings before `id`, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings: &[NodeId] = match (self.parent(id), self.index(id)) {
            (Some(parent), Some(index)) => &self.children(parent)[..index],
            _ => &[],
        };
        siblings.iter().rev().copied()
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// [§ 4.2.1](https://dom.spec.whatwg.org/#concept-tree-inclusive-ancestor)
    ///
    /// "An inclusive ancestor is an object or one of its ancestors."
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    // ===== Typed access =====

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Mutable element data, used to merge attributes onto open elements.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.0).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get doctype data if this node is a document type.
    #[must_use]
    pub fn as_doctype(&self, id: NodeId) -> Option<&DocumentTypeData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::DocumentType(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(data) => Some(data.data()),
            _ => None,
        })
    }

    /// Character data of a Text, CDATA section, Comment or processing
    /// instruction node.
    #[must_use]
    pub fn character_data(&self, id: NodeId) -> Option<&CharacterData> {
        self.get(id).and_then(|n| n.node_type.character_data())
    }

    /// Mutable character data, see [`DomTree::character_data`].
    pub fn character_data_mut(&mut self, id: NodeId) -> Option<&mut CharacterData> {
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.node_type.character_data_mut())
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#document-element)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.nodes[id.0].kind() == NodeKind::Element)
            .copied()
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-doctype)
    ///
    /// "The doctype getter steps are to return the child of this that is a
    /// doctype; otherwise null."
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.nodes[id.0].kind() == NodeKind::DocumentType)
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
