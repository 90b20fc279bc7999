//! HTML Tag Definitions
//!
//! Parsing rules for the HTML elements that need more than the default
//! "parsable data, explicit end tag" treatment.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

pub use super::tags::TagContentType;
use super::tags::TagDefinition;

/// HTML tag definition with specific parsing rules
#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub closed_by_children: HashSet<String>,
    pub content_type: TagContentType,
    pub is_void: bool,
    pub can_self_close: bool,
}

impl HtmlTagDefinition {
    pub fn new() -> Self {
        HtmlTagDefinition {
            closed_by_children: HashSet::new(),
            content_type: TagContentType::ParsableData,
            is_void: false,
            can_self_close: false,
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self.can_self_close = is_void;
        self
    }

    pub fn with_closed_by_children(mut self, children: &[&str]) -> Self {
        for child in children {
            self.closed_by_children.insert(child.to_lowercase());
        }
        self
    }

    pub fn with_content_type(mut self, content_type: TagContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

impl Default for HtmlTagDefinition {
    fn default() -> Self {
        Self::new()
    }
}

impl TagDefinition for HtmlTagDefinition {
    fn is_void(&self) -> bool {
        self.is_void
    }

    fn can_self_close(&self) -> bool {
        self.can_self_close
    }

    fn is_closed_by_child(&self, name: &str) -> bool {
        self.is_void || self.closed_by_children.contains(&name.to_lowercase())
    }

    fn get_content_type(&self) -> TagContentType {
        self.content_type
    }
}

static DEFAULT_TAG_DEFINITION: Lazy<HtmlTagDefinition> = Lazy::new(HtmlTagDefinition::new);

static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    for name in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(name, HtmlTagDefinition::new().with_void(true));
    }

    defs.insert("p", HtmlTagDefinition::new().with_closed_by_children(&[
        "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form",
        "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
        "section", "table", "ul",
    ]));
    defs.insert("li", HtmlTagDefinition::new().with_closed_by_children(&["li"]));
    defs.insert("dt", HtmlTagDefinition::new().with_closed_by_children(&["dt", "dd"]));
    defs.insert("dd", HtmlTagDefinition::new().with_closed_by_children(&["dt", "dd"]));
    defs.insert("tr", HtmlTagDefinition::new().with_closed_by_children(&["tr"]));
    defs.insert("td", HtmlTagDefinition::new().with_closed_by_children(&["td", "th"]));
    defs.insert("th", HtmlTagDefinition::new().with_closed_by_children(&["td", "th"]));
    defs.insert("option", HtmlTagDefinition::new().with_closed_by_children(&["option", "optgroup"]));

    defs.insert("style", HtmlTagDefinition::new().with_content_type(TagContentType::RawText));
    defs.insert("script", HtmlTagDefinition::new().with_content_type(TagContentType::RawText));
    defs.insert("title", HtmlTagDefinition::new().with_content_type(TagContentType::EscapableRawText));
    defs.insert("textarea", HtmlTagDefinition::new().with_content_type(TagContentType::EscapableRawText));

    defs
});

/// Get HTML tag definition (case-insensitive)
pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name.to_lowercase().as_str())
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}

/// Whether text inside `tag_name` is stored verbatim (no markup, no node splicing)
pub fn is_raw_text_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).get_content_type() != TagContentType::ParsableData
}
