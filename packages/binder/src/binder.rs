//! Template Binder
//!
//! Compiles a [`Template`] against a document: composes the markup with
//! placeholder tokens, parses it, locates every token, groups the slots
//! into bound nodes and validates placements. Produces a [`View`] after the
//! initial render.

use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use htmel_dom::serializer::escape_attribute;
use htmel_dom::{Document, Dom, HtmlParser, NodeId, NodeKind};
use indexmap::IndexMap;

use crate::bound_node::BoundNode;
use crate::config::BinderConfig;
use crate::error::{BindingError, Result};
use crate::expression::{Evaluator, Expression};
use crate::locator::{Location, LocationKind, TreeLocator};
use crate::observer::State;
use crate::scheduler::{Clock, RenderScheduler};
use crate::template::Template;
use crate::token::TokenFactory;
use crate::tracker::{qualify, DependencyTracker};
use crate::view::{View, ViewCore};

pub struct TemplateBinder {
    dom: Dom,
    config: BinderConfig,
    clock: Rc<dyn Clock>,
}

impl TemplateBinder {
    pub fn new(dom: Dom, config: BinderConfig, clock: Rc<dyn Clock>) -> Self {
        TemplateBinder { dom, config, clock }
    }

    pub fn bind(self, template: Template, states: &[State]) -> Result<View> {
        self.config.validate()?;

        let (fragments, evaluators) = template.into_parts();
        if fragments.iter().all(|f| f.trim().is_empty()) && evaluators.is_empty() {
            return Err(BindingError::EmptyTemplate.into());
        }

        let labels: Vec<&'static str> = evaluators.iter().map(Evaluator::describe).collect();
        let describe = |index: usize| labels.get(index).copied().unwrap_or("?").to_string();

        // Entity decoding can turn literal markup into token text, so the
        // parsed tree is checked and the prefix bumped until no slot repeats.
        let mut tokens = TokenFactory::for_fragments(&fragments);
        let fragment = loop {
            let fragment = self.parse(&tokens.compose(&fragments));
            let mut doc = self.dom.borrow_mut();
            if !tokens.collides(searchable_text(&doc, fragment), evaluators.len()) {
                break fragment;
            }
            tracing::debug!(prefix = tokens.prefix(), "placeholder prefix occurs in template content");
            doc.remove(fragment);
            tokens = tokens.next(&fragments);
        };
        let (bound_nodes, owners) = {
            let mut doc = self.dom.borrow_mut();
            if doc.children(fragment).is_empty() {
                return Err(BindingError::EmptyTemplate.into());
            }
            self.collect_bound_nodes(&mut doc, fragment, &tokens, evaluators.len(), &describe)?
        };

        let mut expressions: Vec<Expression> = evaluators
            .into_iter()
            .enumerate()
            .map(|(index, evaluator)| Expression::new(index, tokens.token(index), evaluator, owners[index]))
            .collect();
        for node in bound_nodes.iter().filter(|node| node.is_event_target()) {
            for &id in &node.expressions {
                let expression = &mut expressions[id];
                expression.mark_event_handler();
                if !matches!(expression.evaluator, Evaluator::Handler(_)) {
                    tracing::warn!(token = %expression.token, "event handler is not callable");
                }
            }
        }

        let expression_count = expressions.len();
        let bound_node_count = bound_nodes.len();
        let scheduler = RenderScheduler::new(self.config.frame_interval(), self.clock.clone());
        let prune = self.config.prune_stale_dependencies;
        let core = Rc::new_cyclic(|this| ViewCore {
            dom: self.dom.clone(),
            config: self.config,
            fragment,
            expressions: RefCell::new(expressions),
            bound_nodes: RefCell::new(bound_nodes),
            tracker: RefCell::new(DependencyTracker::new(prune)),
            scheduler: RefCell::new(scheduler),
            this: this.clone(),
        });

        let subscriptions = states
            .iter()
            .enumerate()
            .map(|(index, state)| {
                let count = states.len();
                let reader = Rc::downgrade(&core);
                let writer = Rc::downgrade(&core);
                state.observe(
                    move |key| {
                        if let Some(core) = reader.upgrade() {
                            core.record_read(&qualify(index, count, key));
                        }
                    },
                    move |key, _value| match writer.upgrade() {
                        Some(core) => core.notify(&qualify(index, count, key)),
                        None => Ok(()),
                    },
                )
            })
            .collect();

        core.render_all()?;
        tracing::debug!(
            expressions = expression_count,
            bound_nodes = bound_node_count,
            states = states.len(),
            "bound template"
        );
        Ok(View::new(core, subscriptions))
    }

    fn parse(&self, source: &str) -> NodeId {
        let result = {
            let mut doc = self.dom.borrow_mut();
            HtmlParser::new().parse_into(&mut doc, source, &self.config.template_url)
        };
        for error in &result.errors {
            tracing::warn!(error = %error.contextual_message(), "template markup error");
        }
        result.root
    }

    /// Locate every slot and group the slots into bound nodes. Returns the
    /// bound nodes and, per slot, the index of the bound node owning it.
    fn collect_bound_nodes(
        &self,
        doc: &mut Document,
        fragment: NodeId,
        tokens: &TokenFactory,
        slot_count: usize,
        describe: &dyn Fn(usize) -> String,
    ) -> Result<(Vec<BoundNode>, Vec<usize>)> {
        let locator = TreeLocator::new(fragment);
        let excerpt = |doc: &Document, element: NodeId| tokens.describe(&open_tag(doc, element), describe);

        let mut bound_nodes: Vec<BoundNode> = Vec::new();
        let mut attribute_nodes: IndexMap<(NodeId, String, LocationKind), usize> = IndexMap::new();
        let mut owners = Vec::with_capacity(slot_count);

        for index in 0..slot_count {
            let token = tokens.token(index);
            let location = locator
                .find(doc, token.as_str())
                .ok_or_else(|| BindingError::PlaceholderNotFound {
                    token: token.to_string(),
                })?;
            tracing::trace!(token = %token, kind = ?location.kind(), "located placeholder");

            let owner = match location {
                Location::TagName { element } => {
                    return Err(BindingError::TagName {
                        token: token.to_string(),
                        excerpt: excerpt(doc, element),
                    }
                    .into());
                }
                Location::Text(node) => {
                    bound_nodes.push(BoundNode::text(doc, node, token.as_str()));
                    bound_nodes.len() - 1
                }
                Location::AttributeValue { element, attribute } => {
                    if tokens.contains_token(&attribute) {
                        return Err(BindingError::MixedAttributeBinding {
                            attribute: tokens.describe(&attribute, describe),
                            excerpt: excerpt(doc, element),
                        }
                        .into());
                    }
                    let key = (element, attribute, LocationKind::AttributeValue);
                    match attribute_nodes.get(&key).copied() {
                        Some(owner) => owner,
                        None => {
                            let value = doc.get_attribute(element, &key.1).unwrap_or_default();
                            let event = self.config.event_name(&key.1);
                            bound_nodes.push(BoundNode::attribute_value(element, &key.1, value, event));
                            attribute_nodes.insert(key, bound_nodes.len() - 1);
                            bound_nodes.len() - 1
                        }
                    }
                }
                Location::AttributeName { element, attribute } => {
                    if !self.config.allow_attribute_name_bindings {
                        return Err(BindingError::AttributeNameDisallowed {
                            token: token.to_string(),
                            excerpt: excerpt(doc, element),
                        }
                        .into());
                    }
                    let value = doc.get_attribute(element, &attribute).unwrap_or_default().to_string();
                    if tokens.contains_token(&value) {
                        return Err(BindingError::MixedAttributeBinding {
                            attribute: tokens.describe(&attribute, describe),
                            excerpt: excerpt(doc, element),
                        }
                        .into());
                    }
                    let key = (element, attribute, LocationKind::AttributeName);
                    match attribute_nodes.get(&key).copied() {
                        Some(owner) => owner,
                        None => {
                            bound_nodes.push(BoundNode::attribute_name(element, &key.1, &value));
                            attribute_nodes.insert(key, bound_nodes.len() - 1);
                            bound_nodes.len() - 1
                        }
                    }
                }
            };
            bound_nodes[owner].expressions.push(index);
            owners.push(owner);
        }

        for ((element, attribute, _), &owner) in &attribute_nodes {
            let node = &bound_nodes[owner];
            if node.is_event_target() && node.expressions.len() != 1 {
                return Err(BindingError::AmbiguousHandler {
                    attribute: attribute.clone(),
                    count: node.expressions.len(),
                    excerpt: excerpt(doc, *element),
                }
                .into());
            }
        }

        Ok((bound_nodes, owners))
    }
}

/// Every string the locator searches below `root`: text, attribute values,
/// attribute names and tag names
fn searchable_text(doc: &Document, root: NodeId) -> Vec<&str> {
    let mut texts = Vec::new();
    for node in doc.descendants(root) {
        match doc.kind(node) {
            NodeKind::Text(text) => texts.push(text.as_str()),
            _ => {
                texts.extend(doc.tag_name(node));
                for attr in doc.attributes(node) {
                    texts.push(attr.name.as_str());
                    texts.push(attr.value.as_str());
                }
            }
        }
    }
    texts
}

/// Start tag of `element` as markup
fn open_tag(doc: &Document, element: NodeId) -> String {
    let mut out = format!("<{}", doc.tag_name(element).unwrap_or_default());
    for attr in doc.attributes(element) {
        out.push(' ');
        out.push_str(&attr.name);
        if !attr.value.is_empty() {
            let _ = write!(out, "=\"{}\"", escape_attribute(&attr.value));
        }
    }
    out.push('>');
    out
}
