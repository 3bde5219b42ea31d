//! Arena-backed document tree.
//!
//! Nodes live in an `indextree` arena; a `NodeId` stays valid until its
//! subtree is removed, after which `is_attached` reports it as gone even if the
//! slot is recycled.

pub mod forms;
pub mod printing;

use anyhow::{Error, anyhow};
use css_selectors::{ElementAdapter, SelectorList, matches_selector_list};
use indextree::Arena;
use smallvec::SmallVec;

pub use indextree::NodeId;

use forms::ControlState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    /// Detached container produced by fragment parsing.
    Fragment,
    Element { tag: String },
    Text { text: String },
    Comment { text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DOMNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    pub(crate) control: ControlState,
}

impl DOMNode {
    #[inline]
    pub fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            ..Self::default()
        }
    }

    #[inline]
    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..Self::default()
        }
    }

    /// Tag name for elements.
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct DOM {
    dom: Arena<DOMNode>,
    root: NodeId,
}

impl Default for DOM {
    fn default() -> Self {
        Self::new()
    }
}

impl DOM {
    /// An empty document (a lone document node).
    pub fn new() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DOMNode::default()),
            dom,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node data, or `None` once the node has been removed.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        if id.is_removed(&self.dom) {
            return None;
        }
        self.dom.get(id).map(indextree::Node::get)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DOMNode> {
        if id.is_removed(&self.dom) {
            return None;
        }
        self.dom.get_mut(id).map(indextree::Node::get_mut)
    }

    #[inline]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(DOMNode::tag)
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// True when the node is still connected to the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id.is_removed(&self.dom) {
            return false;
        }
        id.ancestors(&self.dom).last() == Some(self.root)
    }

    /// The `<html>` element, falling back to the document node.
    pub fn document_element(&self) -> NodeId {
        self.root
            .children(&self.dom)
            .find(|child| self.tag(*child) == Some("html"))
            .unwrap_or(self.root)
    }

    /// The `<body>` element, falling back to the document node.
    pub fn body(&self) -> NodeId {
        self.root
            .descendants(&self.dom)
            .find(|node| self.tag(*node) == Some("body"))
            .unwrap_or(self.root)
    }

    // -----------------------
    // Tree navigation
    // -----------------------

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.dom.get(id).and_then(indextree::Node::parent)
    }

    /// Parent, only if it is an element.
    #[inline]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.dom).collect()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.dom)
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Elements strictly below `scope`, in document order.
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        scope
            .descendants(&self.dom)
            .skip(1)
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// Elements from `id` up to the root, `id` first.
    pub fn ancestor_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.dom).filter(|node| self.is_element(*node))
    }

    // -----------------------
    // Queries
    // -----------------------

    #[inline]
    pub fn matches(&self, id: NodeId, list: &SelectorList) -> bool {
        self.is_element(id) && matches_selector_list(self, id, list)
    }

    /// `Element.closest`: the element itself or its nearest matching ancestor.
    pub fn closest(&self, id: NodeId, list: &SelectorList) -> Option<NodeId> {
        self.ancestor_elements(id).find(|node| self.matches(*node, list))
    }

    /// Like `closest` but with an arbitrary predicate.
    pub fn closest_where<F>(&self, id: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&Self, NodeId) -> bool,
    {
        self.ancestor_elements(id).find(|node| predicate(self, *node))
    }

    /// First matching element strictly below `scope`, in document order.
    pub fn query_selector(&self, scope: NodeId, list: &SelectorList) -> Option<NodeId> {
        scope
            .descendants(&self.dom)
            .skip(1)
            .find(|node| self.matches(*node, list))
    }

    pub fn query_selector_all(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        scope
            .descendants(&self.dom)
            .skip(1)
            .filter(|node| self.matches(*node, list))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.dom)
            .find(|node| self.is_element(*node) && self.attr(*node, "id") == Some(id))
    }

    // -----------------------
    // Attributes
    // -----------------------

    #[inline]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|node| node.attr(name))
    }

    #[inline]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let name_lc = name.to_ascii_lowercase();
        if let Some(slot) = node.attrs.iter_mut().find(|(key, _)| *key == name_lc) {
            value.clone_into(&mut slot.1);
        } else {
            node.attrs.push((name_lc, value.to_owned()));
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attrs.retain(|(key, _)| key != name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        ElementAdapter::has_class(self, id, class)
    }

    /// Add (`on`) or remove a class token, preserving the order of the others.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        let current = self.attr(id, "class").unwrap_or_default();
        let mut tokens: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|token| *token != class)
            .collect();
        if on {
            tokens.push(class);
        }
        let joined = tokens.join(" ");
        if joined.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &joined);
        }
    }

    // -----------------------
    // Mutation
    // -----------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.dom.new_node(DOMNode::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.dom.new_node(DOMNode::text(text))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.dom.new_node(DOMNode {
            kind: NodeKind::Fragment,
            ..DOMNode::default()
        })
    }

    pub(crate) fn create_node(&mut self, node: DOMNode) -> NodeId {
        self.dom.new_node(node)
    }

    /// Append `child` (detaching it from any previous parent).
    ///
    /// # Errors
    /// Fails on removed nodes or when the append would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        child.detach(&mut self.dom);
        parent
            .checked_append(child, &mut self.dom)
            .map_err(|err| anyhow!("cannot append node: {err}"))
    }

    /// Insert `new_sibling` immediately before `reference`.
    ///
    /// # Errors
    /// Fails on removed nodes or when the insert would create a cycle.
    pub fn insert_before(&mut self, reference: NodeId, new_sibling: NodeId) -> Result<(), Error> {
        new_sibling.detach(&mut self.dom);
        reference
            .checked_insert_before(new_sibling, &mut self.dom)
            .map_err(|err| anyhow!("cannot insert node: {err}"))
    }

    pub fn detach(&mut self, id: NodeId) {
        if !id.is_removed(&self.dom) {
            id.detach(&mut self.dom);
        }
    }

    /// Remove a node and its whole subtree from the arena.
    pub fn remove(&mut self, id: NodeId) {
        if !id.is_removed(&self.dom) {
            id.remove_subtree(&mut self.dom);
        }
    }

    /// Move every child of `from` to the end of `to`, in order.
    ///
    /// # Errors
    /// Propagates append failures.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), Error> {
        for child in self.children(from) {
            self.append_child(to, child)?;
        }
        Ok(())
    }

    /// Drop all children of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.remove(child);
        }
    }

    /// Put `replacement` where `target` was and remove `target`'s subtree.
    ///
    /// # Errors
    /// Fails when `target` has no parent or the insert fails.
    pub fn replace_with(&mut self, target: NodeId, replacement: NodeId) -> Result<(), Error> {
        if self.parent(target).is_none() {
            return Err(anyhow!("cannot replace a node without a parent"));
        }
        self.insert_before(target, replacement)?;
        self.remove(target);
        Ok(())
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in id.descendants(&self.dom) {
            if let Some(DOMNode {
                kind: NodeKind::Text { text },
                ..
            }) = self.node(node)
            {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node (none for empty text).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.node(id).is_none() {
            return;
        }
        self.clear_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            if let Err(err) = id.checked_append(text_node, &mut self.dom) {
                log::warn!("set_text_content: {err}");
            }
        }
    }
}

impl ElementAdapter for DOM {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.parent_element(element)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        element
            .preceding_siblings(&self.dom)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.tag(element).unwrap_or_default()
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        Self::attr(self, element, name)
    }
}
