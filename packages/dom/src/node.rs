//! Tree Nodes
//!
//! Node identities and per-kind node payloads stored in the document arena.

use indexmap::IndexMap;

use crate::events::Listener;
use crate::value::Value;

/// Arena index of a node inside its [`Document`](crate::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Fragment,
    ListContainer,
    Element,
    Text,
    Comment,
}

/// Attribute node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Element payload
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub properties: IndexMap<String, Value>,
    pub listeners: IndexMap<String, Vec<Listener>>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        ElementData {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|a| a.name == name)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Node payload union
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Holds parsed top-level nodes
    Fragment,
    /// Synthetic wrapper holding a materialised sequence
    ListContainer,
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Fragment => NodeType::Fragment,
            NodeKind::ListContainer => NodeType::ListContainer,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}
