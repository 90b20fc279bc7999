//! ML Parser Module
//!
//! HTML lexer, tag definitions and the tree builder that feeds the document

pub mod entities;
pub mod html_parser;
pub mod html_tags;
pub mod lexer;
pub mod parser;
pub mod tags;
pub mod tokens;

pub use html_parser::HtmlParser;
pub use html_tags::{get_html_tag_definition, is_raw_text_element, HtmlTagDefinition};
pub use lexer::{tokenize, TokenizeResult};
pub use parser::{ParseTreeResult, Parser};
pub use tags::{TagContentType, TagDefinition};
pub use tokens::{Token, TokenType};
