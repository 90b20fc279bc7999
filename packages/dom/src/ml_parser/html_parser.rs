//! HTML Parser
//!
//! [`Parser`] configured with the HTML tag definitions.

use super::html_tags::get_html_tag_definition;
use super::parser::{ParseTreeResult, Parser};
use super::tags::TagDefinition;
use crate::document::Document;

fn html_tag_definition(tag_name: &str) -> &'static dyn TagDefinition {
    get_html_tag_definition(tag_name)
}

pub struct HtmlParser {
    parser: Parser,
}

impl HtmlParser {
    pub fn new() -> Self {
        HtmlParser {
            parser: Parser::new(html_tag_definition),
        }
    }

    /// Parse `source` into `doc`, returning the fragment that holds the
    /// top-level nodes
    pub fn parse_into(&self, doc: &mut Document, source: &str, url: &str) -> ParseTreeResult {
        let result = self.parser.parse(doc, source, url);
        tracing::debug!(
            url,
            nodes = doc.descendants(result.root).len() - 1,
            errors = result.errors.len(),
            "parsed template markup"
        );
        result
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
