//! ML Parser Tree Builder
//!
//! Builds document nodes from the lexer's token stream. Parsed nodes are
//! appended under a fresh fragment node.

use super::lexer::tokenize;
use super::tags::{is_custom_or_foreign, TagDefinition};
use super::tokens::{Token, TokenType};
use crate::document::Document;
use crate::node::{NodeId, NodeKind};
use crate::parse_util::{ParseError, ParseSourceSpan};

/// Result of parsing: the fragment holding top-level nodes and every
/// lexer and tree error
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root: NodeId,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root: NodeId, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root, errors }
    }
}

/// Generic markup parser, parameterised by tag definitions
pub struct Parser {
    get_tag_definition: fn(&str) -> &'static dyn TagDefinition,
}

impl Parser {
    pub fn new(get_tag_definition: fn(&str) -> &'static dyn TagDefinition) -> Self {
        Parser { get_tag_definition }
    }

    pub fn parse(&self, doc: &mut Document, source: &str, url: &str) -> ParseTreeResult {
        let tokenized = tokenize(source, url, self.get_tag_definition);
        let root = doc.create_fragment();

        let mut builder = TreeBuilder::new(doc, root, tokenized.tokens, self.get_tag_definition);
        builder.build();

        let mut errors = tokenized.errors;
        errors.extend(builder.errors);
        ParseTreeResult::new(root, errors)
    }
}

struct TreeBuilder<'a> {
    doc: &'a mut Document,
    root: NodeId,
    tokens: Vec<Token>,
    index: usize,
    container_stack: Vec<(NodeId, String)>,
    get_tag_definition: fn(&str) -> &'static dyn TagDefinition,
    errors: Vec<ParseError>,
}

impl<'a> TreeBuilder<'a> {
    fn new(
        doc: &'a mut Document,
        root: NodeId,
        tokens: Vec<Token>,
        get_tag_definition: fn(&str) -> &'static dyn TagDefinition,
    ) -> Self {
        TreeBuilder {
            doc,
            root,
            tokens,
            index: 0,
            container_stack: Vec::new(),
            get_tag_definition,
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while let Some(token) = self.advance() {
            match token.token_type {
                TokenType::Eof => break,
                TokenType::TagOpenStart | TokenType::IncompleteTagOpen => {
                    self.consume_element_start_tag(token)
                }
                TokenType::TagClose => self.consume_element_end_tag(token),
                TokenType::Text | TokenType::RawText | TokenType::EscapableRawText => {
                    self.consume_text(token)
                }
                TokenType::CdataStart => self.consume_cdata(),
                TokenType::CommentStart => self.consume_comment(),
                // Doctypes and stray attribute tokens have no node
                _ => {}
            }
        }
    }

    fn peek_type(&self) -> TokenType {
        self.tokens
            .get(self.index)
            .map(|t| t.token_type)
            .unwrap_or(TokenType::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek_type() == token_type {
            self.advance()
        } else {
            None
        }
    }

    fn consume_text(&mut self, token: Token) {
        let text = token.value();
        if !text.is_empty() {
            self.add_text(text.to_string());
        }
    }

    fn consume_cdata(&mut self) {
        if let Some(text) = self.advance_if(TokenType::Text) {
            self.consume_text(text);
        }
        self.advance_if(TokenType::CdataEnd);
    }

    fn consume_comment(&mut self) {
        let text = self
            .advance_if(TokenType::RawText)
            .map(|t| t.value().to_string())
            .unwrap_or_default();
        self.advance_if(TokenType::CommentEnd);
        let comment = self.doc.create_comment(text);
        self.add_to_parent(comment);
    }

    fn consume_element_start_tag(&mut self, token: Token) {
        let name = token.value().to_string();
        let incomplete = token.token_type == TokenType::IncompleteTagOpen;

        let mut attrs = Vec::new();
        while self.peek_type() == TokenType::AttrName {
            attrs.push(self.consume_attr());
        }

        let tag_def = self.get_tag_definition(&name);
        let mut self_closing = false;
        if let Some(end) = self.advance_if(TokenType::TagOpenEndVoid) {
            self_closing = true;
            if !(tag_def.can_self_close() || is_custom_or_foreign(&name)) {
                self.add_error(
                    format!(
                        "Only void, custom and foreign elements can be self closed \"{}\"",
                        name
                    ),
                    end.source_span,
                );
            }
        } else {
            self.advance_if(TokenType::TagOpenEnd);
        }

        if let Some((_, parent_name)) = self.container_stack.last() {
            if self.get_tag_definition(parent_name).is_closed_by_child(&name) {
                self.container_stack.pop();
            }
        }

        let el = self.doc.create_element(name.as_str());
        for (attr_name, attr_value) in attrs {
            // First occurrence wins
            if !self.doc.has_attribute(el, &attr_name) {
                self.doc.set_attribute(el, &attr_name, attr_value);
            }
        }
        self.add_to_parent(el);

        if !incomplete && !self_closing && !tag_def.is_void() {
            self.container_stack.push((el, name));
        }
    }

    fn consume_attr(&mut self) -> (String, String) {
        let name = self
            .advance()
            .map(|t| t.value().to_string())
            .unwrap_or_default();
        self.advance_if(TokenType::AttrQuote);
        let value = self
            .advance_if(TokenType::AttrValueText)
            .map(|t| t.value().to_string())
            .unwrap_or_default();
        self.advance_if(TokenType::AttrQuote);
        (name, value)
    }

    fn consume_element_end_tag(&mut self, token: Token) {
        let name = token.value();

        if self.get_tag_definition(name).is_void() {
            self.add_error(
                format!("Void elements do not have end tags \"{}\"", name),
                token.source_span.clone(),
            );
            return;
        }

        match self
            .container_stack
            .iter()
            .rposition(|(_, open)| open.eq_ignore_ascii_case(name))
        {
            Some(index) => self.container_stack.truncate(index),
            None => self.add_error(
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag. For more info see https://www.w3.org/TR/html5/syntax.html#closing-elements-that-have-implied-end-tags",
                    name
                ),
                token.source_span.clone(),
            ),
        }
    }

    fn add_error(&mut self, msg: String, span: ParseSourceSpan) {
        self.errors.push(ParseError::new(span, msg));
    }

    fn get_tag_definition(&self, tag_name: &str) -> &'static dyn TagDefinition {
        (self.get_tag_definition)(tag_name)
    }

    fn current_parent(&self) -> NodeId {
        self.container_stack
            .last()
            .map(|(id, _)| *id)
            .unwrap_or(self.root)
    }

    fn add_to_parent(&mut self, node: NodeId) {
        let parent = self.current_parent();
        self.doc.append_child(parent, node);
    }

    /// Adjacent text is merged into a single node
    fn add_text(&mut self, text: String) {
        let parent = self.current_parent();
        if let Some(last) = self.doc.children(parent).last().copied() {
            if let NodeKind::Text(existing) = self.doc.kind(last) {
                let merged = format!("{}{}", existing, text);
                self.doc.set_text(last, merged);
                return;
            }
        }
        let node = self.doc.create_text(text);
        self.doc.append_child(parent, node);
    }
}
