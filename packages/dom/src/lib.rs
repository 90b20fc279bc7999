//! Lightweight document model for template binding
//!
//! An arena-backed node tree with attributes, element properties and event
//! listeners, plus the HTML parser and serializer used to turn template
//! markup into nodes and back.

pub mod chars;
pub mod document;
pub mod events;
pub mod ml_parser;
pub mod node;
pub mod parse_util;
pub mod serializer;
pub mod value;

pub use document::{Document, Dom};
pub use events::{dispatch_event, Listener};
pub use ml_parser::{HtmlParser, ParseTreeResult};
pub use node::{Attribute, ElementData, NodeId, NodeKind, NodeType};
pub use parse_util::{ParseError, ParseErrorLevel, ParseLocation, ParseSourceFile, ParseSourceSpan};
pub use serializer::{inner_html, outer_html};
pub use value::{Function, Value};
