//! Serializer
//!
//! Renders nodes back to markup. Fragments and list containers have no
//! markup of their own; only their children are written.

use crate::document::Document;
use crate::ml_parser::html_tags::{get_html_tag_definition, is_raw_text_element};
use crate::ml_parser::tags::{TagContentType, TagDefinition};
use crate::node::{NodeId, NodeKind};

/// Markup of `id` including its own tag
pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

/// Markup of the children of `id`
pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = raw_text_parent(doc, id);
    for child in doc.children(id) {
        write_node(doc, *child, raw, &mut out);
    }
    out
}

fn raw_text_parent(doc: &Document, id: NodeId) -> bool {
    doc.tag_name(id)
        .map(|name| get_html_tag_definition(name).get_content_type() == TagContentType::RawText)
        .unwrap_or(false)
}

fn write_node(doc: &Document, id: NodeId, raw: bool, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Fragment | NodeKind::ListContainer => {
            for child in doc.children(id) {
                write_node(doc, *child, raw, out);
            }
        }
        NodeKind::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                if !attr.value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
            }
            out.push('>');
            if get_html_tag_definition(&el.name).is_void() {
                return;
            }
            let raw_children = raw_text_parent(doc, id);
            for child in doc.children(id) {
                write_node(doc, *child, raw_children, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether text under `id` is raw text (no markup is interpreted there)
pub fn is_in_raw_text(doc: &Document, id: NodeId) -> bool {
    doc.parent_element(id)
        .and_then(|parent| doc.tag_name(parent))
        .map(is_raw_text_element)
        .unwrap_or(false)
}
