#![allow(dead_code)]

/**
 * Document Test Utilities
 *
 * Helpers that flatten tokens and node trees into string tables
 */
use htmel_dom::ml_parser::html_tags::get_html_tag_definition;
use htmel_dom::ml_parser::lexer::tokenize;
use htmel_dom::ml_parser::tags::TagDefinition;
use htmel_dom::ml_parser::tokens::TokenType;
use htmel_dom::{Document, HtmlParser, NodeId, NodeKind, ParseLocation, ParseTreeResult};

fn html_def(name: &str) -> &'static dyn TagDefinition {
    get_html_tag_definition(name)
}

/// `[type, parts...]` per token, `Eof` included
pub fn humanize_parts(source: &str) -> Vec<Vec<String>> {
    tokenize(source, "TestComp", html_def)
        .tokens
        .iter()
        .map(|token| {
            let mut row = vec![format!("{:?}", token.token_type)];
            row.extend(token.parts.iter().cloned());
            row
        })
        .collect()
}

pub fn humanize_token_types(source: &str) -> Vec<TokenType> {
    tokenize(source, "TestComp", html_def)
        .tokens
        .iter()
        .map(|token| token.token_type)
        .collect()
}

/// `[msg, line:col]` per lexer error
pub fn humanize_lexer_errors(source: &str) -> Vec<Vec<String>> {
    tokenize(source, "TestComp", html_def)
        .errors
        .iter()
        .map(|e| vec![e.msg.clone(), humanize_line_column(&e.span.start)])
        .collect()
}

pub fn humanize_line_column(location: &ParseLocation) -> String {
    format!("{}:{}", location.line, location.col)
}

pub fn parse(source: &str) -> (Document, ParseTreeResult) {
    let mut doc = Document::new();
    let result = HtmlParser::new().parse_into(&mut doc, source, "TestComp");
    (doc, result)
}

/// `[kind, name-or-text, depth]` per node below the fragment, in document
/// order. Attributes follow their element as `[Attribute, name, value]`.
pub fn humanize_dom(doc: &Document, root: NodeId) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for child in doc.children(root) {
        humanize_node(doc, *child, 0, &mut rows);
    }
    rows
}

fn humanize_node(doc: &Document, id: NodeId, depth: usize, rows: &mut Vec<Vec<String>>) {
    match doc.kind(id) {
        NodeKind::Element(el) => {
            rows.push(vec!["Element".to_string(), el.name.clone(), depth.to_string()]);
            for attr in &el.attrs {
                rows.push(vec![
                    "Attribute".to_string(),
                    attr.name.clone(),
                    attr.value.clone(),
                ]);
            }
        }
        NodeKind::Text(text) => {
            rows.push(vec!["Text".to_string(), text.clone(), depth.to_string()]);
        }
        NodeKind::Comment(text) => {
            rows.push(vec!["Comment".to_string(), text.clone(), depth.to_string()]);
        }
        NodeKind::Fragment | NodeKind::ListContainer => {}
    }
    for child in doc.children(id) {
        humanize_node(doc, *child, depth + 1, rows);
    }
}

/// Build a row from string slices
pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
