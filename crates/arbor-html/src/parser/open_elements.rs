use arbor_dom::{DomTree, ElementData, Namespace, NodeId};

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
///
/// "Initially, the stack of open elements is empty. The stack grows
/// downwards; the topmost node on the stack is the first one added to the
/// stack, and the bottommost node of the stack is the most recently added
/// node in the stack."
///
/// Holds handles into the [`DomTree`]; element names and namespaces are read
/// from the tree when a query needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenElements {
    stack: Vec<NodeId>,
}

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// The element types that end a "has an element in scope" search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// "has an element in scope"
    Default,
    /// "has an element in list item scope": default plus `ol`, `ul`.
    ListItem,
    /// "has an element in button scope": default plus `button`.
    Button,
}

impl Scope {
    /// Whether `element` is one of the element types that bound this scope.
    #[must_use]
    pub fn is_boundary(self, element: &ElementData) -> bool {
        match self {
            Self::Default => is_default_scope_boundary(element),
            Self::ListItem => {
                is_default_scope_boundary(element)
                    || element.is_html("ol")
                    || element.is_html("ul")
            }
            Self::Button => is_default_scope_boundary(element) || element.is_html("button"),
        }
    }
}

/// "The stack of open elements is said to have a particular element in
/// scope when it has that element in the specific scope consisting of the
/// following element types:"
fn is_default_scope_boundary(element: &ElementData) -> bool {
    let name = element.local_name.as_str();
    match element.namespace {
        Namespace::Html => matches!(
            name,
            "applet" | "caption" | "html" | "table" | "td" | "th" | "marquee" | "object"
                | "template"
        ),
        Namespace::MathMl => matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml"),
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

impl OpenElements {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push a node; it becomes the current node.
    pub fn push(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    /// Pop the current node.
    pub fn pop(&mut self) -> Option<NodeId> {
        self.stack.pop()
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    /// The topmost node, which is the `html` element once one exists.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.stack.first().copied()
    }

    /// The entry `index` positions from the top (0 is the `html` element).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.stack.get(index).copied()
    }

    /// Number of open elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether no element is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Whether `id` is open.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.stack.contains(&id)
    }

    /// Entries from the topmost (`html`) to the current node.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.stack
    }

    /// Remove `id` wherever it is in the stack. Returns whether it was there.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(index) = self.stack.iter().rposition(|&n| n == id) else {
            return false;
        };
        let _ = self.stack.remove(index);
        true
    }

    /// Keep the first `len` entries and pop the rest.
    pub fn truncate(&mut self, len: usize) {
        self.stack.truncate(len);
    }

    /// Pop every entry.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Whether an HTML element named `tag_name` is open anywhere.
    #[must_use]
    pub fn contains_html(&self, tree: &DomTree, tag_name: &str) -> bool {
        self.stack
            .iter()
            .any(|&id| tree.as_element(id).is_some_and(|e| e.is_html(tag_name)))
    }

    /// Position of the lowest open HTML element with one of `tag_names`.
    #[must_use]
    pub fn position_of_one_of(&self, tree: &DomTree, tag_names: &[&str]) -> Option<usize> {
        self.stack.iter().rposition(|&id| {
            tree.as_element(id).is_some_and(|e| {
                e.namespace == Namespace::Html && tag_names.contains(&e.local_name.as_str())
            })
        })
    }

    /// Pop elements until an HTML element named `tag_name` has been popped.
    pub fn pop_until_tag(&mut self, tree: &DomTree, tag_name: &str) {
        self.pop_until_one_of(tree, &[tag_name]);
    }

    /// Pop elements until an HTML element with one of `tag_names` has been
    /// popped.
    pub fn pop_until_one_of(&mut self, tree: &DomTree, tag_names: &[&str]) {
        while let Some(id) = self.stack.pop() {
            if tree.as_element(id).is_some_and(|e| {
                e.namespace == Namespace::Html && tag_names.contains(&e.local_name.as_str())
            }) {
                break;
            }
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    ///
    /// The target is any HTML element whose tag name is in `tag_names`.
    #[must_use]
    pub fn has_one_of_in_scope(&self, tree: &DomTree, tag_names: &[&str], scope: Scope) -> bool {
        for &id in self.stack.iter().rev() {
            let Some(element) = tree.as_element(id) else {
                continue;
            };
            if element.namespace == Namespace::Html
                && tag_names.contains(&element.local_name.as_str())
            {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Whether an HTML element named `tag_name` is in `scope`.
    #[must_use]
    pub fn has_in_scope(&self, tree: &DomTree, tag_name: &str, scope: Scope) -> bool {
        self.has_one_of_in_scope(tree, &[tag_name], scope)
    }

    /// Whether the specific node `target` is in the default scope.
    #[must_use]
    pub fn has_node_in_scope(&self, tree: &DomTree, target: NodeId) -> bool {
        for &id in self.stack.iter().rev() {
            if id == target {
                return true;
            }
            if tree
                .as_element(id)
                .is_some_and(|e| Scope::Default.is_boundary(e))
            {
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(tree: &mut DomTree, stack: &mut OpenElements, name: &str, ns: Namespace) -> NodeId {
        let id = tree.create_element(name, ns);
        stack.push(id);
        id
    }

    #[test]
    fn button_scope_stops_at_button() {
        let mut tree = DomTree::new();
        let mut stack = OpenElements::new();
        let _ = open(&mut tree, &mut stack, "html", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "p", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "button", Namespace::Html);

        assert!(stack.has_in_scope(&tree, "p", Scope::Default));
        assert!(!stack.has_in_scope(&tree, "p", Scope::Button));
    }

    #[test]
    fn foreign_boundaries_bound_default_scope() {
        let mut tree = DomTree::new();
        let mut stack = OpenElements::new();
        let _ = open(&mut tree, &mut stack, "html", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "p", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "svg", Namespace::Svg);
        let _ = open(&mut tree, &mut stack, "foreignObject", Namespace::Svg);

        assert!(!stack.has_in_scope(&tree, "p", Scope::Default));
        assert!(!stack.has_in_scope(&tree, "p", Scope::Button));
        assert!(stack.contains_html(&tree, "p"));
    }

    #[test]
    fn pop_until_ignores_foreign_namesakes() {
        let mut tree = DomTree::new();
        let mut stack = OpenElements::new();
        let html = open(&mut tree, &mut stack, "html", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "title", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "svg", Namespace::Svg);
        let _ = open(&mut tree, &mut stack, "title", Namespace::Svg);

        assert_eq!(stack.position_of_one_of(&tree, &["title"]), Some(1));
        stack.pop_until_tag(&tree, "title");
        assert_eq!(stack.as_slice(), &[html]);
    }

    #[test]
    fn position_finds_lowest_match() {
        let mut tree = DomTree::new();
        let mut stack = OpenElements::new();
        let _ = open(&mut tree, &mut stack, "html", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "h1", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "div", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "h2", Namespace::Html);
        let _ = open(&mut tree, &mut stack, "span", Namespace::Html);

        assert_eq!(stack.position_of_one_of(&tree, &["h1", "h2"]), Some(3));
        assert_eq!(stack.position_of_one_of(&tree, &["h1"]), Some(1));
        assert_eq!(stack.position_of_one_of(&tree, &["p"]), None);
    }
}
