//! ML Parser Tokens
//!
//! Token stream produced by the lexer and consumed by the tree builder.

use serde::{Deserialize, Serialize};

use crate::parse_util::ParseSourceSpan;

/// Token types for HTML parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    TagOpenStart,
    TagOpenEnd,
    TagOpenEndVoid,
    TagClose,
    IncompleteTagOpen,
    Text,
    EscapableRawText,
    RawText,
    CommentStart,
    CommentEnd,
    CdataStart,
    CdataEnd,
    AttrName,
    AttrQuote,
    AttrValueText,
    DocType,
    Eof,
}

/// A token and the decoded parts it carries.
///
/// Parts by type:
/// - `TagOpenStart`, `IncompleteTagOpen`, `TagClose`: `[name]`
/// - `AttrName`: `[name]`
/// - `AttrQuote`: `[quote]`
/// - `AttrValueText`, `Text`, `RawText`, `EscapableRawText`, `DocType`: `[text]`
/// - everything else: `[]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub parts: Vec<String>,
    pub source_span: ParseSourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, parts: Vec<String>, source_span: ParseSourceSpan) -> Self {
        Token {
            token_type,
            parts,
            source_span,
        }
    }

    /// First part, or the empty string for tokens without parts
    pub fn value(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }
}
