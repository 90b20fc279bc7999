//! Document
//!
//! Arena-backed tree. Nodes are never freed; removing a node only detaches it
//! so it can be re-inserted later (list re-materialisation relies on this).

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::Listener;
use crate::node::{Attribute, ElementData, NodeData, NodeId, NodeKind, NodeType};
use crate::value::Value;

/// Shared document handle
pub type Dom = Rc<RefCell<Document>>;

#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Document { nodes: Vec::new() }
    }

    /// Create a shared handle around a fresh document
    pub fn shared() -> Dom {
        Rc::new(RefCell::new(Document::new()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    pub fn create_list_container(&mut self) -> NodeId {
        self.alloc(NodeKind::ListContainer)
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(name)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    // ---------------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.nodes[id.0].kind.node_type()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order traversal, `root` included
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            result.push(node);
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
        }
        result
    }

    /// Detach a node from its parent. Detached nodes stay in the arena.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.contains(child, parent), "cannot append a node into itself");
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` before `reference`; appends when `reference` is `None`
    /// or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if reference == Some(child) {
            return;
        }
        self.remove(child);
        let index = reference
            .and_then(|r| self.children(parent).iter().position(|c| *c == r))
            .unwrap_or(self.children(parent).len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Insert `child` directly after `node`. Returns false if `node` is detached.
    pub fn insert_after(&mut self, node: NodeId, child: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let next = self.next_sibling(node);
        self.insert_before(parent, child, next);
        true
    }

    /// Put `replacement` where `old` is. Returns false if `old` is detached.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> bool {
        if old == replacement {
            return true;
        }
        self.remove(replacement);
        let Some(parent) = self.parent(old) else {
            return false;
        };
        let Some(index) = self.index_in_parent(old) else {
            return false;
        };
        self.nodes[parent.0].children[index] = replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        true
    }

    /// Detach every child of `id`, returning them in order
    pub fn clear_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the data of a text or comment node. Returns false for other kinds.
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> bool {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.nodes[n.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Elements
    // ---------------------------------------------------------------------

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    /// The nearest ancestor element of `id`, excluding `id` itself
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.element(node).is_some() {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|el| el.attrs.as_slice()).unwrap_or(&[])
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.get_attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            let value = value.into();
            match el.attr_index(name) {
                Some(index) => el.attrs[index].value = value,
                None => el.attrs.push(Attribute::new(name, value)),
            }
        }
    }

    /// Remove an attribute, returning its value if it existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let el = self.element_mut(id)?;
        let index = el.attr_index(name)?;
        Some(el.attrs.remove(index).value)
    }

    /// Rename an attribute in place, keeping its value and position. An
    /// existing attribute already called `to` is dropped first.
    pub fn rename_attribute(&mut self, id: NodeId, from: &str, to: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        if from == to {
            return el.attr_index(from).is_some();
        }
        if el.attr_index(from).is_none() {
            return false;
        }
        if let Some(existing) = el.attr_index(to) {
            el.attrs.remove(existing);
        }
        match el.attr_index(from) {
            Some(index) => {
                el.attrs[index].name = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn property(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.element(id).and_then(|el| el.properties.get(name))
    }

    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) {
        if let Some(el) = self.element_mut(id) {
            el.properties.insert(name.to_string(), value);
        }
    }

    pub fn remove_property(&mut self, id: NodeId, name: &str) -> Option<Value> {
        self.element_mut(id)
            .and_then(|el| el.properties.shift_remove(name))
    }

    pub fn add_event_listener(&mut self, id: NodeId, event: &str, listener: Listener) {
        if let Some(el) = self.element_mut(id) {
            el.listeners
                .entry(event.to_string())
                .or_default()
                .push(listener);
        }
    }

    /// Snapshot of the listeners registered for `event`
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<Listener> {
        self.element(id)
            .and_then(|el| el.listeners.get(event))
            .cloned()
            .unwrap_or_default()
    }

    /// Element children of `id`
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }
}
