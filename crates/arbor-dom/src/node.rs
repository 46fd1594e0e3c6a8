//! Node handles and per-variant node data.

use std::collections::HashMap;

use strum_macros::Display;

use crate::character_data::CharacterData;
use crate::namespace::Namespace;

/// Map of attribute qualified names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#dom-node-nodetype)
///
/// The numeric `nodeType` of a node. Several variants of [`NodeType`] can
/// share a kind (a shadow root is a document fragment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[repr(u16)]
pub enum NodeKind {
    /// `ELEMENT_NODE`
    Element = 1,
    /// `ATTRIBUTE_NODE`
    Attribute = 2,
    /// `TEXT_NODE`
    Text = 3,
    /// `CDATA_SECTION_NODE`
    CdataSection = 4,
    /// `PROCESSING_INSTRUCTION_NODE`
    ProcessingInstruction = 7,
    /// `COMMENT_NODE`
    Comment = 8,
    /// `DOCUMENT_NODE`
    Document = 9,
    /// `DOCUMENT_TYPE_NODE`
    DocumentType = 10,
    /// `DOCUMENT_FRAGMENT_NODE`
    DocumentFragment = 11,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// Each variant carries the data of one concrete node interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType(DocumentTypeData),
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.8 Interface ShadowRoot](https://dom.spec.whatwg.org/#interface-shadowroot)
    ShadowRoot,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
    Attr(AttrData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(CharacterData),
    /// [§ 4.12 Interface CDATASection](https://dom.spec.whatwg.org/#interface-cdatasection)
    CdataSection(CharacterData),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(CharacterData),
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ProcessingInstruction(ProcessingInstructionData),
}

impl NodeType {
    /// The `nodeType` tag of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::DocumentType(_) => NodeKind::DocumentType,
            Self::DocumentFragment | Self::ShadowRoot => NodeKind::DocumentFragment,
            Self::Element(_) => NodeKind::Element,
            Self::Attr(_) => NodeKind::Attribute,
            Self::Text(_) => NodeKind::Text,
            Self::CdataSection(_) => NodeKind::CdataSection,
            Self::Comment(_) => NodeKind::Comment,
            Self::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }

    /// Character data of `Text`, `CdataSection`, `Comment` and
    /// `ProcessingInstruction` nodes.
    #[must_use]
    pub const fn character_data(&self) -> Option<&CharacterData> {
        match self {
            Self::Text(data) | Self::CdataSection(data) | Self::Comment(data) => Some(data),
            Self::ProcessingInstruction(pi) => Some(&pi.data),
            _ => None,
        }
    }

    /// Mutable character data, see [`NodeType::character_data`].
    pub const fn character_data_mut(&mut self) -> Option<&mut CharacterData> {
        match self {
            Self::Text(data) | Self::CdataSection(data) | Self::Comment(data) => Some(data),
            Self::ProcessingInstruction(pi) => Some(&mut pi.data),
            _ => None,
        }
    }

    /// [§ 4.2.1 Document tree](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Whether a node of this type may have children at all: documents,
    /// fragments (including shadow roots) and elements.
    #[must_use]
    pub const fn can_have_children(&self) -> bool {
        matches!(
            self,
            Self::Document | Self::DocumentFragment | Self::ShadowRoot | Self::Element(_)
        )
    }

    /// Whether inserting this node inserts its children instead.
    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        matches!(self, Self::DocumentFragment | Self::ShadowRoot)
    }
}

/// Document type data.
///
/// Per [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype):
/// "Doctypes have an associated name, public ID, and system ID."
/// "When a doctype is created, its name is always given. Unless explicitly
/// given when a doctype is created, its public ID and system ID are the
/// empty string."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: String,
    /// "system ID"
    pub system_id: String,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// - "Elements have an associated namespace, namespace prefix, local name, custom element state,
///   custom element definition, is value."
/// - "When an element is created, its local name is always given."
///
/// NOTE: Prefix, custom element state and is value are not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub local_name: String,
    /// "An element's namespace"
    pub namespace: Namespace,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// An element with no attributes.
    #[must_use]
    pub fn new(local_name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            local_name: local_name.into(),
            namespace,
            attrs: AttributesMap::new(),
        }
    }

    /// Whether this is an element of the HTML namespace named `local_name`.
    #[must_use]
    pub fn is_html(&self, local_name: &str) -> bool {
        self.namespace == Namespace::Html && self.local_name == local_name
    }

    /// Value of the attribute with the given qualified name.
    #[must_use]
    pub fn attribute(&self, qualified_name: &str) -> Option<&str> {
        self.attrs.get(qualified_name).map(String::as_str)
    }
}

/// Attribute node data.
///
/// Per [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr):
/// "Attr nodes are simply known as attributes."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrData {
    /// "An attribute's qualified name"
    pub name: String,
    /// "An attribute's value"
    pub value: String,
}

/// Processing instruction data.
///
/// Per [§ 4.13](https://dom.spec.whatwg.org/#interface-processinginstruction):
/// "ProcessingInstruction nodes have an associated target."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingInstructionData {
    /// "target"
    pub target: String,
    /// The instruction's character data.
    pub data: CharacterData,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// One arena slot: the node's data plus its place in the tree. Sibling
/// links are not stored; they are derived from the parent's child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub(crate) parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The node's parent, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node's children in tree order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The `nodeType` tag of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.node_type.kind()
    }
}
