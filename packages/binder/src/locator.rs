//! Tree Locator
//!
//! Finds where a placeholder token ended up after the composed markup was
//! parsed. The whole tree is searched once per location kind, in order:
//! text, attribute value, attribute name, tag name. The first match wins.

use htmel_dom::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    TextContent,
    AttributeValue,
    AttributeName,
    TagName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Text node holding exactly the token
    Text(NodeId),
    AttributeValue { element: NodeId, attribute: String },
    AttributeName { element: NodeId, attribute: String },
    TagName { element: NodeId },
}

impl Location {
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Text(_) => LocationKind::TextContent,
            Location::AttributeValue { .. } => LocationKind::AttributeValue,
            Location::AttributeName { .. } => LocationKind::AttributeName,
            Location::TagName { .. } => LocationKind::TagName,
        }
    }

    /// Element that owns the location; the text node itself for text
    pub fn node(&self) -> NodeId {
        match self {
            Location::Text(node) => *node,
            Location::AttributeValue { element, .. }
            | Location::AttributeName { element, .. }
            | Location::TagName { element } => *element,
        }
    }
}

pub struct TreeLocator {
    root: NodeId,
}

impl TreeLocator {
    pub fn new(root: NodeId) -> Self {
        TreeLocator { root }
    }

    /// Locate `token` below `root` (inclusive). A text match is split so
    /// that the token occupies its own text node.
    pub fn find(&self, doc: &mut Document, token: &str) -> Option<Location> {
        let nodes = doc.descendants(self.root);

        let text = nodes.iter().copied().find(|node| {
            matches!(doc.kind(*node), NodeKind::Text(text) if text.contains(token))
        });
        if let Some(node) = text {
            return split_text_node(doc, node, token).map(Location::Text);
        }

        for node in &nodes {
            if let Some(attr) = doc.attributes(*node).iter().find(|a| a.value.contains(token)) {
                return Some(Location::AttributeValue {
                    element: *node,
                    attribute: attr.name.clone(),
                });
            }
        }

        for node in &nodes {
            if let Some(attr) = doc.attributes(*node).iter().find(|a| a.name.contains(token)) {
                return Some(Location::AttributeName {
                    element: *node,
                    attribute: attr.name.clone(),
                });
            }
        }

        nodes
            .iter()
            .copied()
            .find(|node| doc.tag_name(*node).is_some_and(|name| name.contains(token)))
            .map(|element| Location::TagName { element })
    }
}

/// Split the text node `node` around the first occurrence of `token`.
///
/// The node keeps the token itself; any leading and trailing remainder
/// become new sibling text nodes before and after it. Returns `None` when
/// the token does not occur.
pub fn split_text_node(doc: &mut Document, node: NodeId, token: &str) -> Option<NodeId> {
    let text = doc.text(node)?.to_string();
    let start = text.find(token)?;
    let end = start + token.len();
    let (before, after) = (&text[..start], &text[end..]);

    if before.is_empty() && after.is_empty() {
        return Some(node);
    }

    let parent = doc.parent(node);
    doc.set_text(node, token);
    if !before.is_empty() {
        let leading = doc.create_text(before);
        if let Some(parent) = parent {
            doc.insert_before(parent, leading, Some(node));
        }
    }
    if !after.is_empty() {
        let trailing = doc.create_text(after);
        doc.insert_after(node, trailing);
    }
    Some(node)
}
