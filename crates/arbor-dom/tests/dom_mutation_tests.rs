//! Tests for DOM tree insertion: append_child, pre_insert, fragments and the
//! hierarchy checks that keep the tree well formed.

use arbor_dom::{DomError, DomTree, Namespace, NodeId, NodeKind, NodeType};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(tag, Namespace::Html)
}

/// Append and panic on failure.
fn append(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    let _ = tree
        .append_child(parent, child)
        .expect("append_child should succeed");
}

/// A document with an `html` element, returning the element.
fn document_with_html(tree: &mut DomTree) -> NodeId {
    let html = alloc_element(tree, "html");
    append(tree, NodeId::ROOT, html);
    html
}

// ========== append_child ==========

#[test]
fn test_append_preserves_order() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.first_child(parent), Some(a));
    assert_eq!(tree.last_child(parent), Some(c));
    assert_eq!(tree.parent(b), Some(parent));
}

#[test]
fn test_append_returns_inserted_node() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    assert_eq!(tree.append_child(NodeId::ROOT, html), Ok(html));
}

#[test]
fn test_has_child_nodes() {
    let mut tree = DomTree::new();
    assert!(!tree.has_child_nodes(NodeId::ROOT));
    assert_eq!(tree.first_child(NodeId::ROOT), None);
    assert_eq!(tree.last_child(NodeId::ROOT), None);

    let html = document_with_html(&mut tree);
    assert!(tree.has_child_nodes(NodeId::ROOT));
    assert!(!tree.has_child_nodes(html));
}

// ========== siblings ==========

#[test]
fn test_siblings_are_derived_from_child_list() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let a = alloc_element(&mut tree, "a");
    let b = tree.create_text("b");
    let c = tree.create_comment("c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);
    append(&mut tree, parent, c);

    assert_eq!(tree.previous_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.previous_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.previous_sibling(c), Some(b));
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.index(c), Some(2));
}

#[test]
fn test_detached_node_has_no_siblings() {
    let mut tree = DomTree::new();
    let lonely = alloc_element(&mut tree, "div");
    assert_eq!(tree.parent(lonely), None);
    assert_eq!(tree.previous_sibling(lonely), None);
    assert_eq!(tree.next_sibling(lonely), None);
    assert_eq!(tree.index(lonely), None);
}

// ========== pre_insert ==========

#[test]
fn test_insert_before_reference_child() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    append(&mut tree, parent, a);
    append(&mut tree, parent, c);

    let b = alloc_element(&mut tree, "b");
    assert_eq!(tree.pre_insert(parent, b, Some(c)), Ok(b));
    assert_eq!(tree.children(parent), &[a, b, c]);

    let first = alloc_element(&mut tree, "first");
    let _ = tree.pre_insert(parent, first, Some(a)).expect("insert at front");
    assert_eq!(tree.children(parent), &[first, a, b, c]);
}

#[test]
fn test_reference_child_must_belong_to_parent() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let stranger = alloc_element(&mut tree, "span");
    let node = alloc_element(&mut tree, "p");

    assert_eq!(
        tree.pre_insert(parent, node, Some(stranger)),
        Err(DomError::NotAChild {
            child: stranger,
            parent,
        })
    );
    assert!(!tree.has_child_nodes(parent));
    assert_eq!(tree.parent(node), None);
}

#[test]
fn test_insert_before_itself_leaves_tree_unchanged() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    append(&mut tree, parent, a);
    append(&mut tree, parent, b);

    assert_eq!(tree.pre_insert(parent, a, Some(a)), Ok(a));
    assert_eq!(tree.pre_insert(parent, b, Some(b)), Ok(b));
    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.next_sibling(a), Some(b));
}

#[test]
fn test_fragment_children_are_inserted_in_order() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let end = alloc_element(&mut tree, "end");
    append(&mut tree, parent, end);

    let fragment = tree.create_document_fragment();
    let a = alloc_element(&mut tree, "a");
    let b = tree.create_text("b");
    append(&mut tree, fragment, a);
    append(&mut tree, fragment, b);

    let _ = tree
        .pre_insert(parent, fragment, Some(end))
        .expect("fragment insert");

    assert_eq!(tree.children(parent), &[a, b, end]);
    assert!(!tree.has_child_nodes(fragment));
    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.parent(fragment), None);
}

#[test]
fn test_empty_fragment_is_a_no_op() {
    let mut tree = DomTree::new();
    let parent = document_with_html(&mut tree);
    let fragment = tree.create_document_fragment();

    assert_eq!(tree.append_child(parent, fragment), Ok(fragment));
    assert!(!tree.has_child_nodes(parent));
}

// ========== hierarchy checks ==========

#[test]
fn test_cycle_is_rejected() {
    let mut tree = DomTree::new();
    let outer = document_with_html(&mut tree);
    let inner = alloc_element(&mut tree, "div");
    append(&mut tree, outer, inner);

    assert_eq!(
        tree.append_child(inner, outer),
        Err(DomError::Cycle {
            node: outer,
            parent: inner,
        })
    );
    assert_eq!(
        tree.append_child(inner, inner),
        Err(DomError::Cycle {
            node: inner,
            parent: inner,
        })
    );
}

#[test]
fn test_text_cannot_have_children() {
    let mut tree = DomTree::new();
    let text = tree.create_text("hello");
    let child = alloc_element(&mut tree, "b");

    assert_eq!(
        tree.append_child(text, child),
        Err(DomError::CannotHaveChildren {
            parent: text,
            kind: NodeKind::Text,
        })
    );
}

#[test]
fn test_reparenting_is_rejected() {
    let mut tree = DomTree::new();
    let html = document_with_html(&mut tree);
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "div");
    let child = alloc_element(&mut tree, "p");
    append(&mut tree, html, first);
    append(&mut tree, html, second);
    append(&mut tree, first, child);

    assert_eq!(
        tree.append_child(second, child),
        Err(DomError::AlreadyHasParent(child))
    );
    assert_eq!(tree.children(first), &[child]);
    assert!(!tree.has_child_nodes(second));
}

#[test]
fn test_unknown_handles_are_rejected() {
    let mut tree = DomTree::new();
    let missing = NodeId(tree.len() + 10);
    assert_eq!(
        tree.append_child(NodeId::ROOT, missing),
        Err(DomError::UnknownNode(missing))
    );
}

#[test]
fn test_document_and_attr_cannot_be_inserted() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    assert_eq!(
        tree.append_child(div, NodeId::ROOT),
        Err(DomError::InvalidChildKind(NodeKind::Document))
    );

    let attr = tree.alloc(NodeType::Attr(arbor_dom::AttrData {
        name: "id".to_string(),
        value: "x".to_string(),
    }));
    assert_eq!(
        tree.append_child(div, attr),
        Err(DomError::InvalidChildKind(NodeKind::Attribute))
    );
}

#[test]
fn test_document_accepts_one_element() {
    let mut tree = DomTree::new();
    let _ = document_with_html(&mut tree);
    let second = alloc_element(&mut tree, "html");

    assert!(matches!(
        tree.append_child(NodeId::ROOT, second),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(tree.children(NodeId::ROOT).len(), 1);
}

#[test]
fn test_document_rejects_text() {
    let mut tree = DomTree::new();
    let text = tree.create_text("stray");
    assert!(matches!(
        tree.append_child(NodeId::ROOT, text),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_doctype_only_under_document_and_before_element() {
    let mut tree = DomTree::new();
    let html = document_with_html(&mut tree);

    let doctype = tree.create_document_type("html", "", "");
    assert!(matches!(
        tree.append_child(html, doctype),
        Err(DomError::HierarchyRequest(_))
    ));
    // Appending after the document element is refused...
    assert!(matches!(
        tree.append_child(NodeId::ROOT, doctype),
        Err(DomError::HierarchyRequest(_))
    ));
    // ...but inserting before it is fine.
    let _ = tree
        .pre_insert(NodeId::ROOT, doctype, Some(html))
        .expect("doctype before html");
    assert_eq!(tree.children(NodeId::ROOT), &[doctype, html]);
    assert_eq!(tree.doctype(), Some(doctype));
    assert_eq!(tree.document_element(), Some(html));

    let another = tree.create_document_type("html", "", "");
    assert!(matches!(
        tree.pre_insert(NodeId::ROOT, another, Some(doctype)),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_element_cannot_precede_doctype() {
    let mut tree = DomTree::new();
    let doctype = tree.create_document_type("html", "", "");
    append(&mut tree, NodeId::ROOT, doctype);

    let html = alloc_element(&mut tree, "html");
    assert!(matches!(
        tree.pre_insert(NodeId::ROOT, html, Some(doctype)),
        Err(DomError::HierarchyRequest(_))
    ));
    append(&mut tree, NodeId::ROOT, html);
    assert_eq!(tree.children(NodeId::ROOT), &[doctype, html]);
}

#[test]
fn test_fragment_with_two_elements_rejected_by_document() {
    let mut tree = DomTree::new();
    let fragment = tree.create_document_fragment();
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    append(&mut tree, fragment, a);
    append(&mut tree, fragment, b);

    assert!(matches!(
        tree.append_child(NodeId::ROOT, fragment),
        Err(DomError::HierarchyRequest(_))
    ));
    // Nothing moved.
    assert_eq!(tree.children(fragment), &[a, b]);
    assert!(!tree.has_child_nodes(NodeId::ROOT));
}

#[test]
fn test_comments_are_allowed_anywhere_in_document() {
    let mut tree = DomTree::new();
    let before = tree.create_comment("before");
    append(&mut tree, NodeId::ROOT, before);
    let html = document_with_html(&mut tree);
    let after = tree.create_comment("after");
    append(&mut tree, NodeId::ROOT, after);

    assert_eq!(tree.children(NodeId::ROOT), &[before, html, after]);
}

// ========== traversal ==========

#[test]
fn test_ancestors_walk_to_root() {
    let mut tree = DomTree::new();
    let html = document_with_html(&mut tree);
    let body = alloc_element(&mut tree, "body");
    let p = alloc_element(&mut tree, "p");
    append(&mut tree, html, body);
    append(&mut tree, body, p);

    let chain: Vec<NodeId> = tree.ancestors(p).collect();
    assert_eq!(chain, vec![body, html, NodeId::ROOT]);
    assert!(tree.is_inclusive_ancestor(html, p));
    assert!(tree.is_inclusive_ancestor(p, p));
    assert!(!tree.is_inclusive_ancestor(p, html));
}

#[test]
fn test_typed_accessors() {
    let mut tree = DomTree::new();
    let svg = tree.create_element("svg", Namespace::Svg);
    let text = tree.create_text("hi");

    let element = tree.as_element(svg).expect("svg is an element");
    assert_eq!(element.local_name, "svg");
    assert_eq!(element.namespace, Namespace::Svg);
    assert!(!element.is_html("svg"));
    assert!(tree.as_element(text).is_none());
    assert_eq!(tree.as_text(text), Some("hi"));

    let _ = tree
        .as_element_mut(svg)
        .expect("svg is an element")
        .attrs
        .insert("viewBox".to_string(), "0 0 10 10".to_string());
    assert_eq!(
        tree.as_element(svg).and_then(|e| e.attribute("viewBox")),
        Some("0 0 10 10")
    );
}
