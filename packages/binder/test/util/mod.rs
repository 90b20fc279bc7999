#![allow(dead_code)]

/**
 * Binder Test Utilities
 *
 * Binding shortcuts, tree inspection and a manual clock setup
 */
use std::rc::Rc;

use htmel::{BinderConfig, Document, Dom, ManualClock, NodeId, State, Template, View};
use htmel_dom::{outer_html, NodeKind};

/// Config without rate limiting: every change flushes immediately
pub fn eager() -> BinderConfig {
    BinderConfig::default().with_max_fps(0)
}

pub fn bind(template: Template, states: &[State]) -> (Dom, View) {
    let dom = Document::shared();
    let view = template
        .bind(&dom, states, eager())
        .expect("template should bind");
    (dom, view)
}

/// Bind at 10 fps (100ms frames) against a hand-driven clock
pub fn bind_timed(template: Template, states: &[State]) -> (Dom, View, ManualClock) {
    let dom = Document::shared();
    let clock = ManualClock::new();
    let view = template
        .bind_with_clock(
            &dom,
            states,
            BinderConfig::default().with_max_fps(10),
            Rc::new(clock.clone()),
        )
        .expect("template should bind");
    (dom, view, clock)
}

/// Template holding only literal markup
pub fn literal(markup: &str) -> Template {
    Template::literal(markup)
}

/// A dynamic slot reading `key` from `state`
pub fn read(state: &State, key: &str) -> impl Fn() -> htmel::Value + 'static {
    let state = state.clone();
    let key = key.to_string();
    move || state.get(&key)
}

/// First element named `name` below the view's fragment
pub fn find_element(view: &View, name: &str) -> Option<NodeId> {
    let doc = view.dom().borrow();
    doc.descendants(view.fragment())
        .into_iter()
        .find(|node| doc.tag_name(*node) == Some(name))
}

pub fn outer(view: &View, node: NodeId) -> String {
    outer_html(&view.dom().borrow(), node)
}

/// Kinds of the children of `node`, e.g. `["Text", "Element"]`
pub fn child_kinds(view: &View, node: NodeId) -> Vec<String> {
    let doc = view.dom().borrow();
    doc.children(node)
        .iter()
        .map(|child| match doc.kind(*child) {
            NodeKind::Fragment => "Fragment".to_string(),
            NodeKind::ListContainer => "ListContainer".to_string(),
            NodeKind::Element(_) => "Element".to_string(),
            NodeKind::Text(_) => "Text".to_string(),
            NodeKind::Comment(_) => "Comment".to_string(),
        })
        .collect()
}
