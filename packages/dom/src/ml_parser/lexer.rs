//! ML Parser Lexer
//!
//! Turns template markup into a flat token stream. Character references are
//! decoded here, so text and attribute value tokens carry final strings.
//! Tag and attribute names are kept verbatim (no case folding).

use once_cell::sync::Lazy;
use regex::Regex;

use super::entities::lookup_named_entity;
use super::tags::{TagContentType, TagDefinition};
use super::tokens::{Token, TokenType};
use crate::chars;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};

static CR_OR_CRLF_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n?").expect("valid line ending pattern"));

/// Result of tokenization
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

/// Tokenize `source`. Line endings are normalised to `\n` first and NUL
/// characters replaced with U+FFFD.
pub fn tokenize(
    source: &str,
    url: &str,
    get_tag_definition: fn(&str) -> &'static dyn TagDefinition,
) -> TokenizeResult {
    let content = CR_OR_CRLF_REGEXP
        .replace_all(source, "\n")
        .replace(chars::EOF, "\u{FFFD}");
    let file = ParseSourceFile::new(content, url.to_string());
    let mut tokenizer = Tokenizer::new(file, get_tag_definition);
    tokenizer.tokenize();
    TokenizeResult {
        tokens: tokenizer.tokens,
        errors: tokenizer.errors,
    }
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: usize,
    col: usize,
}

struct Tokenizer {
    file: ParseSourceFile,
    cursor: Cursor,
    get_tag_definition: fn(&str) -> &'static dyn TagDefinition,
    current_token_start: Option<Cursor>,
    current_token_type: Option<TokenType>,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl Tokenizer {
    fn new(file: ParseSourceFile, get_tag_definition: fn(&str) -> &'static dyn TagDefinition) -> Self {
        Tokenizer {
            file,
            cursor: Cursor {
                offset: 0,
                line: 0,
                col: 0,
            },
            get_tag_definition,
            current_token_start: None,
            current_token_type: None,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(&mut self) {
        while !self.at_end() {
            let start = self.cursor;
            if self.is_tag_start() {
                self.advance(); // '<'
                if self.attempt_char_code(chars::BANG) {
                    if self.attempt_str("[CDATA[") {
                        self.consume_cdata(start);
                    } else if self.attempt_str("--") {
                        self.consume_comment(start);
                    } else {
                        self.consume_doc_type(start);
                    }
                } else if self.attempt_char_code(chars::SLASH) {
                    self.consume_tag_close(start);
                } else {
                    self.consume_tag_open(start);
                }
            } else {
                self.consume_text();
            }
        }

        self.begin_token(TokenType::Eof);
        self.end_token(vec![]);
    }

    // ---------------------------------------------------------------------
    // Cursor
    // ---------------------------------------------------------------------

    fn at_end(&self) -> bool {
        self.cursor.offset >= self.file.content.len()
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> char {
        self.file.content[self.cursor.offset..]
            .chars()
            .nth(n)
            .unwrap_or(chars::EOF)
    }

    fn advance(&mut self) {
        let ch = self.peek();
        if self.at_end() {
            return;
        }
        self.cursor.offset += ch.len_utf8();
        if ch == chars::NEWLINE {
            self.cursor.line += 1;
            self.cursor.col = 0;
        } else {
            self.cursor.col += 1;
        }
    }

    fn location(&self, at: Cursor) -> ParseLocation {
        ParseLocation::new(self.file.clone(), at.offset, at.line, at.col)
    }

    fn span_from(&self, start: Cursor) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(self.cursor))
    }

    fn attempt_char_code(&mut self, char_code: char) -> bool {
        if !self.at_end() && self.peek() == char_code {
            self.advance();
            true
        } else {
            false
        }
    }

    fn attempt_str(&mut self, s: &str) -> bool {
        if self.file.content[self.cursor.offset..].starts_with(s) {
            for _ in s.chars() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && chars::is_whitespace(self.peek()) {
            self.advance();
        }
    }

    /// `<` followed by a letter, `/letter` or `!`
    fn is_tag_start(&self) -> bool {
        if self.peek() != chars::LT {
            return false;
        }
        let next = self.peek_at(1);
        next.is_alphabetic()
            || next == chars::BANG
            || (next == chars::SLASH && self.peek_at(2).is_alphabetic())
    }

    fn is_name_end(ch: char) -> bool {
        chars::is_whitespace(ch)
            || ch == chars::GT
            || ch == chars::LT
            || ch == chars::SLASH
            || ch == chars::SQ
            || ch == chars::DQ
            || ch == chars::EQ
            || ch == chars::EOF
    }

    // ---------------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------------

    fn begin_token(&mut self, token_type: TokenType) {
        self.begin_token_at(token_type, self.cursor);
    }

    fn begin_token_at(&mut self, token_type: TokenType, start: Cursor) {
        self.current_token_type = Some(token_type);
        self.current_token_start = Some(start);
    }

    fn end_token(&mut self, parts: Vec<String>) {
        let start = self.current_token_start.take().unwrap_or(self.cursor);
        let token_type = self.current_token_type.take().unwrap_or(TokenType::Eof);
        let source_span = self.span_from(start);
        self.tokens.push(Token::new(token_type, parts, source_span));
    }

    fn handle_error(&mut self, msg: String, start: Cursor) {
        let span = self.span_from(start);
        self.errors.push(ParseError::new(span, msg));
    }

    fn unexpected_eof(&mut self) {
        let at = self.cursor;
        self.handle_error("Unexpected character \"EOF\"".to_string(), at);
    }

    // ---------------------------------------------------------------------
    // Consumers
    // ---------------------------------------------------------------------

    fn consume_text(&mut self) {
        self.begin_token(TokenType::Text);
        let mut text = String::new();
        // The first character is always text, even if it is a stray '<'
        loop {
            match self.try_read_entity_at_cursor() {
                Some(decoded) => text.push_str(&decoded),
                None => {
                    text.push(self.peek());
                    self.advance();
                }
            }
            if self.at_end() || self.is_tag_start() {
                break;
            }
        }
        self.end_token(vec![text]);
    }

    fn try_read_entity_at_cursor(&mut self) -> Option<String> {
        if self.peek() == chars::AMPERSAND {
            self.try_read_entity()
        } else {
            None
        }
    }

    /// Decode a character reference at the cursor. The cursor is left
    /// untouched when no known reference is found.
    fn try_read_entity(&mut self) -> Option<String> {
        let start = self.cursor;
        self.advance(); // '&'

        if self.attempt_char_code(chars::HASH) {
            let is_hex = self.attempt_char_code('x') || self.attempt_char_code('X');
            let mut digits = String::new();
            while (is_hex && chars::is_ascii_hex_digit(self.peek()))
                || (!is_hex && chars::is_digit(self.peek()))
            {
                digits.push(self.peek());
                self.advance();
            }
            if digits.is_empty() {
                self.cursor = start;
                return None;
            }
            self.attempt_char_code(chars::SEMICOLON);
            let code = u32::from_str_radix(&digits, if is_hex { 16 } else { 10 }).ok();
            let decoded = code.and_then(char::from_u32).unwrap_or('\u{FFFD}');
            return Some(decoded.to_string());
        }

        let mut name = String::new();
        while self.peek().is_ascii_alphanumeric() {
            name.push(self.peek());
            self.advance();
        }
        match lookup_named_entity(&name) {
            Some(decoded) if !name.is_empty() => {
                self.attempt_char_code(chars::SEMICOLON);
                Some(decoded.to_string())
            }
            _ => {
                self.cursor = start;
                None
            }
        }
    }

    fn consume_cdata(&mut self, start: Cursor) {
        self.begin_token_at(TokenType::CdataStart, start);
        self.end_token(vec![]);

        self.begin_token(TokenType::Text);
        let mut content = String::new();
        while !self.at_end() && !self.file.content[self.cursor.offset..].starts_with("]]>") {
            content.push(self.peek());
            self.advance();
        }
        self.end_token(vec![content]);

        self.begin_token(TokenType::CdataEnd);
        if !self.attempt_str("]]>") {
            self.unexpected_eof();
        }
        self.end_token(vec![]);
    }

    fn consume_comment(&mut self, start: Cursor) {
        self.begin_token_at(TokenType::CommentStart, start);
        self.end_token(vec![]);

        self.begin_token(TokenType::RawText);
        let mut content = String::new();
        while !self.at_end() && !self.file.content[self.cursor.offset..].starts_with("-->") {
            content.push(self.peek());
            self.advance();
        }
        self.end_token(vec![content]);

        self.begin_token(TokenType::CommentEnd);
        if !self.attempt_str("-->") {
            self.unexpected_eof();
        }
        self.end_token(vec![]);
    }

    fn consume_doc_type(&mut self, start: Cursor) {
        self.begin_token_at(TokenType::DocType, start);
        let mut content = String::new();
        while !self.at_end() && self.peek() != chars::GT {
            content.push(self.peek());
            self.advance();
        }
        if !self.attempt_char_code(chars::GT) {
            self.unexpected_eof();
        }
        self.end_token(vec![content]);
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while !Self::is_name_end(self.peek()) {
            name.push(self.peek());
            self.advance();
        }
        name
    }

    fn consume_tag_open(&mut self, start: Cursor) {
        self.begin_token_at(TokenType::TagOpenStart, start);
        let tag_name = self.read_name();
        self.end_token(vec![tag_name.clone()]);
        let open_start_index = self.tokens.len() - 1;

        let mut closed = false;
        loop {
            self.skip_whitespace();
            if self.at_end() || self.peek() == chars::LT {
                break;
            }
            if self.peek() == chars::GT {
                self.begin_token(TokenType::TagOpenEnd);
                self.advance();
                self.end_token(vec![]);
                closed = true;
                break;
            }
            if self.peek() == chars::SLASH {
                if self.peek_at(1) == chars::GT {
                    self.begin_token(TokenType::TagOpenEndVoid);
                    self.advance();
                    self.advance();
                    self.end_token(vec![]);
                    // Self-closed tags never have raw text content
                    return;
                }
                self.advance();
                continue;
            }
            self.consume_attribute();
        }

        if !closed {
            self.tokens[open_start_index].token_type = TokenType::IncompleteTagOpen;
            self.handle_error(format!("Opening tag \"{}\" not terminated.", tag_name), start);
            return;
        }

        match (self.get_tag_definition)(&tag_name).get_content_type() {
            TagContentType::RawText => self.consume_raw_text_with_tag_close(false, &tag_name),
            TagContentType::EscapableRawText => self.consume_raw_text_with_tag_close(true, &tag_name),
            TagContentType::ParsableData => {}
        }
    }

    fn consume_attribute(&mut self) {
        let start = self.cursor;
        self.begin_token(TokenType::AttrName);
        let mut name = String::new();
        while !self.at_end() {
            let ch = self.peek();
            if chars::is_whitespace(ch)
                || ch == chars::EQ
                || ch == chars::GT
                || ch == chars::LT
                || (ch == chars::SLASH && self.peek_at(1) == chars::GT)
            {
                break;
            }
            name.push(ch);
            self.advance();
        }
        if name.is_empty() {
            self.current_token_type = None;
            self.current_token_start = None;
            self.advance();
            let msg = format!(
                "Unexpected character \"{}\"",
                &self.file.content[start.offset..self.cursor.offset]
            );
            self.handle_error(msg, start);
            return;
        }
        self.end_token(vec![name]);

        let before_eq = self.cursor;
        self.skip_whitespace();
        if self.attempt_char_code(chars::EQ) {
            self.skip_whitespace();
            self.consume_attribute_value();
        } else {
            // Whitespace belongs to the tag, not to the attribute
            self.cursor = before_eq;
        }
    }

    fn consume_attribute_value(&mut self) {
        let quote = self.peek();
        if chars::is_quote(quote) {
            self.begin_token(TokenType::AttrQuote);
            self.advance();
            self.end_token(vec![quote.to_string()]);

            self.begin_token(TokenType::AttrValueText);
            let value = self.read_until(|_, ch| ch == quote, true);
            self.end_token(vec![value]);

            self.begin_token(TokenType::AttrQuote);
            if self.attempt_char_code(quote) {
                self.end_token(vec![quote.to_string()]);
            } else {
                self.current_token_type = None;
                self.current_token_start = None;
                self.unexpected_eof();
            }
        } else {
            self.begin_token(TokenType::AttrValueText);
            let value = self.read_until(|_, ch| chars::is_whitespace(ch) || ch == chars::GT, true);
            self.end_token(vec![value]);
        }
    }

    /// Read characters until `stop` matches or input ends, decoding
    /// character references when `decode` is set.
    fn read_until(&mut self, stop: impl Fn(&Self, char) -> bool, decode: bool) -> String {
        let mut text = String::new();
        while !self.at_end() && !stop(self, self.peek()) {
            if decode {
                if let Some(decoded) = self.try_read_entity_at_cursor() {
                    text.push_str(&decoded);
                    continue;
                }
            }
            text.push(self.peek());
            self.advance();
        }
        text
    }

    fn consume_raw_text_with_tag_close(&mut self, consume_entities: bool, tag_name: &str) {
        let token_type = if consume_entities {
            TokenType::EscapableRawText
        } else {
            TokenType::RawText
        };
        self.begin_token(token_type);
        let text = self.read_until(|this, _| this.is_closing_tag_match(tag_name), consume_entities);
        self.end_token(vec![text]);
    }

    /// `</tag_name` followed by a name terminator, case-insensitively
    fn is_closing_tag_match(&self, tag_name: &str) -> bool {
        let rest = &self.file.content[self.cursor.offset..];
        let Some(after) = rest.strip_prefix("</") else {
            return false;
        };
        let Some(candidate) = after.get(..tag_name.len()) else {
            return false;
        };
        if !candidate.eq_ignore_ascii_case(tag_name) {
            return false;
        }
        after[tag_name.len()..]
            .chars()
            .next()
            .map(|ch| chars::is_whitespace(ch) || ch == chars::GT || ch == chars::SLASH)
            .unwrap_or(true)
    }

    fn consume_tag_close(&mut self, start: Cursor) {
        self.begin_token_at(TokenType::TagClose, start);
        self.skip_whitespace();
        let name = self.read_name();
        self.skip_whitespace();
        if !self.attempt_char_code(chars::GT) {
            let at = self.cursor;
            self.handle_error("Unexpected character, expected '>'".to_string(), at);
            while !self.at_end() && self.peek() != chars::GT && self.peek() != chars::LT {
                self.advance();
            }
            self.attempt_char_code(chars::GT);
        }
        self.end_token(vec![name]);
    }
}
