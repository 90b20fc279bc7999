//! Bound Nodes
//!
//! A bound node pairs one tree location with the expressions that target
//! it and knows how to patch that location from their latest results.

use htmel_dom::serializer::is_in_raw_text;
use htmel_dom::{Document, Function, NodeId, Value};
use smallvec::SmallVec;

use crate::locator::LocationKind;
use crate::tracker::ExpressionId;

/// An expression result handed to [`BoundNode::update`]
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub id: ExpressionId,
    pub token: &'a str,
    pub value: &'a Value,
}

/// Shape of what currently stands in for a text placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextShape {
    Text,
    List,
    Node,
}

/// A text placeholder's value, classified for patching
#[derive(Debug, Clone, PartialEq)]
pub enum TextValue {
    Text(String),
    List(Vec<Value>),
    Node(NodeId),
    Empty,
}

impl TextValue {
    /// Raw-text parents (`style`, `script`, ...) only ever get strings
    pub fn classify(value: &Value, raw_text: bool) -> TextValue {
        match value {
            v if v.is_blank() => TextValue::Empty,
            v if raw_text => TextValue::Text(v.to_string()),
            Value::List(items) => TextValue::List(items.clone()),
            Value::Node(node) => TextValue::Node(*node),
            other => TextValue::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextBinding {
    pub target: NodeId,
    pub shape: TextShape,
    pub raw_text: bool,
}

#[derive(Debug, Clone)]
pub struct AttributeValueBinding {
    pub element: NodeId,
    pub attribute: String,
    /// Event name when the attribute is an event target
    pub event: Option<String>,
    pub listening: bool,
}

#[derive(Debug, Clone)]
pub struct AttributeNameBinding {
    pub element: NodeId,
    /// Attribute names set by the previous update
    pub applied: Vec<String>,
    /// Whether `applied` came from a map result
    pub from_map: bool,
    /// Value carried over to the renamed attribute
    pub value: String,
}

#[derive(Debug, Clone)]
pub enum Binding {
    Text(TextBinding),
    AttributeValue(AttributeValueBinding),
    AttributeName(AttributeNameBinding),
}

#[derive(Debug, Clone)]
pub struct BoundNode {
    pub binding: Binding,
    pub expressions: SmallVec<[ExpressionId; 2]>,
    /// Literal text with tokens: the token for text, the attribute value or
    /// the attribute name otherwise
    pub initial_value: String,
}

impl BoundNode {
    pub fn text(doc: &Document, node: NodeId, token: &str) -> Self {
        BoundNode {
            binding: Binding::Text(TextBinding {
                target: node,
                shape: TextShape::Text,
                raw_text: is_in_raw_text(doc, node),
            }),
            expressions: SmallVec::new(),
            initial_value: token.to_string(),
        }
    }

    pub fn attribute_value(element: NodeId, attribute: &str, value: &str, event: Option<String>) -> Self {
        BoundNode {
            binding: Binding::AttributeValue(AttributeValueBinding {
                element,
                attribute: attribute.to_string(),
                event,
                listening: false,
            }),
            expressions: SmallVec::new(),
            initial_value: value.to_string(),
        }
    }

    pub fn attribute_name(element: NodeId, attribute: &str, value: &str) -> Self {
        BoundNode {
            binding: Binding::AttributeName(AttributeNameBinding {
                element,
                applied: vec![attribute.to_string()],
                from_map: false,
                value: value.to_string(),
            }),
            expressions: SmallVec::new(),
            initial_value: attribute.to_string(),
        }
    }

    pub fn kind(&self) -> LocationKind {
        match &self.binding {
            Binding::Text(_) => LocationKind::TextContent,
            Binding::AttributeValue(_) => LocationKind::AttributeValue,
            Binding::AttributeName(_) => LocationKind::AttributeName,
        }
    }

    pub fn is_event_target(&self) -> bool {
        matches!(&self.binding, Binding::AttributeValue(b) if b.event.is_some())
    }

    /// Node currently standing in for the binding
    pub fn target(&self) -> NodeId {
        match &self.binding {
            Binding::Text(b) => b.target,
            Binding::AttributeValue(b) => b.element,
            Binding::AttributeName(b) => b.element,
        }
    }

    /// Whether a single expression makes up the whole literal
    fn is_whole(&self, values: &[Resolved<'_>]) -> bool {
        values.len() == 1 && self.initial_value == values[0].token
    }

    /// Replace every token in the literal with its value's string form
    fn substitute(&self, values: &[Resolved<'_>]) -> String {
        values.iter().fold(self.initial_value.clone(), |text, resolved| {
            text.replace(resolved.token, &resolved.value.to_string())
        })
    }

    /// Patch the tree from `values`, which hold this node's expressions in
    /// order. `make_listener` builds the event listener for an expression.
    pub fn update(
        &mut self,
        doc: &mut Document,
        values: &[Resolved<'_>],
        make_listener: &dyn Fn(ExpressionId) -> Function,
    ) {
        let whole = self.is_whole(values);
        let substituted = if whole { None } else { Some(self.substitute(values)) };
        match &mut self.binding {
            Binding::Text(binding) => {
                if let Some(resolved) = values.first() {
                    update_text(doc, binding, resolved.value);
                }
            }
            Binding::AttributeValue(binding) => {
                if binding.event.is_some() {
                    if let Some(resolved) = values.first() {
                        activate_event(doc, binding, make_listener(resolved.id));
                    }
                } else if whole {
                    update_whole_attribute(doc, binding, values[0].value);
                } else if let Some(text) = substituted {
                    tracing::trace!(attribute = %binding.attribute, value = %text, "patching attribute value");
                    doc.set_attribute(binding.element, &binding.attribute, text);
                }
            }
            Binding::AttributeName(binding) => {
                let next = if whole {
                    match values[0].value {
                        Value::Bool(false) | Value::Null | Value::Undefined => AttributeNames::None,
                        Value::String(name) if name.is_empty() => AttributeNames::None,
                        Value::Map(entries) => AttributeNames::Map(
                            entries
                                .iter()
                                .map(|(k, v)| (k.clone(), v.clone()))
                                .collect(),
                        ),
                        other => AttributeNames::Single(other.to_string()),
                    }
                } else {
                    match substituted {
                        Some(name) if !name.is_empty() => AttributeNames::Single(name),
                        _ => AttributeNames::None,
                    }
                };
                update_attribute_names(doc, binding, next);
            }
        }
    }
}

fn update_text(doc: &mut Document, binding: &mut TextBinding, value: &Value) {
    match TextValue::classify(value, binding.raw_text) {
        TextValue::Empty => set_text(doc, binding, String::new()),
        TextValue::Text(text) => set_text(doc, binding, text),
        TextValue::List(items) => {
            let container = if binding.shape == TextShape::List {
                doc.clear_children(binding.target);
                binding.target
            } else {
                let container = doc.create_list_container();
                if !replace_target(doc, binding, container) {
                    return;
                }
                binding.shape = TextShape::List;
                container
            };
            for item in items {
                let child = match item {
                    Value::Node(node) if !doc.contains(node, container) => node,
                    Value::Node(node) => {
                        tracing::warn!(node = node.index(), "list item would contain its own list; skipped");
                        continue;
                    }
                    v if v.is_blank() => doc.create_text(""),
                    v => doc.create_text(v.to_string()),
                };
                doc.append_child(container, child);
            }
            tracing::trace!(container = container.index(), "materialized list");
        }
        TextValue::Node(node) => {
            if node == binding.target {
                return;
            }
            if doc.contains(node, binding.target) {
                tracing::warn!(node = node.index(), "node value contains its own placeholder; skipped");
                return;
            }
            if replace_target(doc, binding, node) {
                binding.shape = TextShape::Node;
            }
        }
    }
}

fn set_text(doc: &mut Document, binding: &mut TextBinding, text: String) {
    if binding.shape == TextShape::Text {
        doc.set_text(binding.target, text);
        return;
    }
    let node = doc.create_text(text);
    if replace_target(doc, binding, node) {
        binding.shape = TextShape::Text;
    }
}

/// Swap the current target for `replacement`, keeping the target current
fn replace_target(doc: &mut Document, binding: &mut TextBinding, replacement: NodeId) -> bool {
    if doc.replace_with(binding.target, replacement) {
        binding.target = replacement;
        true
    } else {
        tracing::warn!(node = binding.target.index(), "bound text node is detached; update dropped");
        false
    }
}

fn activate_event(doc: &mut Document, binding: &mut AttributeValueBinding, listener: Function) {
    if binding.listening {
        return;
    }
    let Some(event) = binding.event.as_deref() else {
        return;
    };
    doc.remove_attribute(binding.element, &binding.attribute);
    doc.add_event_listener(binding.element, event, listener);
    binding.listening = true;
    tracing::trace!(event, element = binding.element.index(), "attached event listener");
}

fn update_whole_attribute(doc: &mut Document, binding: &AttributeValueBinding, value: &Value) {
    let (element, name) = (binding.element, binding.attribute.as_str());
    match value {
        Value::Bool(true) => {
            doc.remove_property(element, name);
            doc.set_attribute(element, name, "");
        }
        v if v.is_blank() => {
            doc.remove_property(element, name);
            doc.remove_attribute(element, name);
        }
        v if v.is_structured() => {
            doc.remove_attribute(element, name);
            doc.set_property(element, name, v.clone());
        }
        v => {
            doc.remove_property(element, name);
            doc.set_attribute(element, name, v.to_string());
        }
    }
}

enum AttributeNames {
    None,
    Single(String),
    Map(Vec<(String, Value)>),
}

fn update_attribute_names(doc: &mut Document, binding: &mut AttributeNameBinding, next: AttributeNames) {
    let element = binding.element;
    let previous = std::mem::take(&mut binding.applied);
    let was_map = std::mem::replace(&mut binding.from_map, matches!(next, AttributeNames::Map(_)));

    // A single rename keeps the attribute's position and current value
    if let (AttributeNames::Single(name), [old], false) = (&next, previous.as_slice(), was_map) {
        if let Some(current) = doc.get_attribute(element, old) {
            binding.value = current.to_string();
            doc.rename_attribute(element, old, name);
            binding.applied = vec![name.clone()];
            return;
        }
    }

    for name in &previous {
        doc.remove_attribute(element, name);
    }
    match next {
        AttributeNames::None => {}
        AttributeNames::Single(name) => {
            doc.set_attribute(element, &name, binding.value.clone());
            binding.applied = vec![name];
        }
        AttributeNames::Map(entries) => {
            for (name, value) in entries {
                match value {
                    Value::Bool(true) => doc.set_attribute(element, &name, ""),
                    v if v.is_blank() => continue,
                    v => doc.set_attribute(element, &name, v.to_string()),
                }
                binding.applied.push(name);
            }
        }
    }
}
