//! Text dump of a document in the html5lib tree-construction test format.

use std::fmt::Write;

use arbor_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

use crate::parser::foreign_attribute;

/// Render every node below the Document, one per line.
///
/// Each line starts with `| ` followed by two spaces per level of depth.
/// Elements in the SVG and MathML namespaces are prefixed with `svg ` or
/// `math `, and their namespaced attributes are written as `xlink href`.
/// Attributes are listed one per line, sorted, one level below their
/// element.
///
/// ```
/// use arbor_dom::{DomTree, Namespace, NodeId};
/// use arbor_html::dump_tree;
///
/// let mut tree = DomTree::new();
/// let html = tree.create_element("html", Namespace::Html);
/// let _ = tree.append_child(NodeId::ROOT, html).unwrap();
/// let text = tree.create_text("hi");
/// let _ = tree.append_child(html, text).unwrap();
///
/// assert_eq!(dump_tree(&tree), "| <html>\n|   \"hi\"\n");
/// ```
#[must_use]
pub fn dump_tree(tree: &DomTree) -> String {
    let mut out = String::new();
    for &child in tree.children(NodeId::ROOT) {
        dump_node(tree, child, 0, &mut out);
    }
    out
}

fn dump_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = format!("| {}", "  ".repeat(depth));
    match &node.node_type {
        NodeType::Document => {}
        NodeType::DocumentType(doctype) => {
            if doctype.public_id.is_empty() && doctype.system_id.is_empty() {
                let _ = writeln!(out, "{prefix}<!DOCTYPE {}>", doctype.name);
            } else {
                let _ = writeln!(
                    out,
                    "{prefix}<!DOCTYPE {} \"{}\" \"{}\">",
                    doctype.name, doctype.public_id, doctype.system_id
                );
            }
        }
        NodeType::DocumentFragment | NodeType::ShadowRoot => {
            let _ = writeln!(out, "{prefix}content");
        }
        NodeType::Element(element) => {
            match element.namespace.display_prefix() {
                Some(ns) => {
                    let _ = writeln!(out, "{prefix}<{ns} {}>", element.local_name);
                }
                None => {
                    let _ = writeln!(out, "{prefix}<{}>", element.local_name);
                }
            }
            dump_attributes(element, depth + 1, out);
        }
        NodeType::Attr(attr) => {
            let _ = writeln!(out, "{prefix}{}=\"{}\"", attr.name, attr.value);
        }
        NodeType::Text(data) => {
            let _ = writeln!(out, "{prefix}\"{}\"", data.data());
        }
        NodeType::CdataSection(data) => {
            let _ = writeln!(out, "{prefix}<![CDATA[{}]]>", data.data());
        }
        NodeType::Comment(data) => {
            let _ = writeln!(out, "{prefix}<!-- {} -->", data.data());
        }
        NodeType::ProcessingInstruction(pi) => {
            let _ = writeln!(out, "{prefix}<?{} {}>", pi.target, pi.data.data());
        }
    }
    for &child in tree.children(id) {
        dump_node(tree, child, depth + 1, out);
    }
}

fn dump_attributes(element: &ElementData, depth: usize, out: &mut String) {
    let foreign = element.namespace != Namespace::Html;
    let mut attributes: Vec<(String, &str)> = element
        .attrs
        .iter()
        .map(|(name, value)| {
            let shown = match foreign_attribute(name) {
                Some((Some(prefix), local, _)) if foreign => format!("{prefix} {local}"),
                _ => name.clone(),
            };
            (shown, value.as_str())
        })
        .collect();
    attributes.sort_unstable();

    let prefix = format!("| {}", "  ".repeat(depth));
    for (name, value) in attributes {
        let _ = writeln!(out, "{prefix}{name}=\"{value}\"");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctype_with_identifiers_is_quoted() {
        let mut tree = DomTree::new();
        let doctype = tree.create_document_type("html", "-//W3C//DTD HTML 4.01//EN", "");
        let _ = tree.append_child(NodeId::ROOT, doctype).unwrap();
        assert_eq!(
            dump_tree(&tree),
            "| <!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"\">\n"
        );
    }

    #[test]
    fn foreign_elements_show_namespace_and_sorted_attributes() {
        let mut tree = DomTree::new();
        let svg = tree.create_element("svg", Namespace::Svg);
        let _ = tree.append_child(NodeId::ROOT, svg).unwrap();
        let use_element = tree.create_element("use", Namespace::Svg);
        let _ = tree.append_child(svg, use_element).unwrap();
        let element = tree.as_element_mut(use_element).unwrap();
        let _ = element.attrs.insert("xlink:href".to_string(), "#a".to_string());
        let _ = element.attrs.insert("id".to_string(), "u".to_string());

        assert_eq!(
            dump_tree(&tree),
            "| <svg svg>\n|   <svg use>\n|     id=\"u\"\n|     xlink href=\"#a\"\n"
        );
    }

    #[test]
    fn html_elements_keep_prefixed_attribute_names() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div", Namespace::Html);
        let _ = tree.append_child(NodeId::ROOT, div).unwrap();
        let _ = tree
            .as_element_mut(div)
            .unwrap()
            .attrs
            .insert("xlink:href".to_string(), "x".to_string());
        let comment = tree.create_comment("note");
        let _ = tree.append_child(div, comment).unwrap();

        assert_eq!(
            dump_tree(&tree),
            "| <div>\n|   xlink:href=\"x\"\n|   <!-- note -->\n"
        );
    }
}
