//! ML Parser Tags
//!
//! Tag content models and the tag definition interface the tree builder
//! consults for void elements and implicit closing.

/// Tag content types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    EscapableRawText,
    ParsableData,
}

/// Tag definition interface
pub trait TagDefinition {
    fn is_void(&self) -> bool;
    fn can_self_close(&self) -> bool;
    fn is_closed_by_child(&self, name: &str) -> bool;
    fn get_content_type(&self) -> TagContentType;
}

/// Custom elements (`my-widget`) and namespaced elements (`svg:path`) may be self-closed
pub fn is_custom_or_foreign(tag_name: &str) -> bool {
    tag_name.contains('-') || tag_name.contains(':')
}
