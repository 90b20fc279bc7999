//! Errors
//!
//! Bind-time template mistakes, runtime evaluation failures and scheduling
//! misuse. Template excerpts render each placeholder as `${<slot kind>}`.

use thiserror::Error;

/// Structural template mistakes, detected once while binding
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("Calculating element name is not allowed: {excerpt}")]
    TagName { token: String, excerpt: String },

    #[error("Attribute name bindings are disabled: {excerpt}")]
    AttributeNameDisallowed { token: String, excerpt: String },

    #[error("Attribute can't be bound in both name and value: {excerpt}")]
    MixedAttributeBinding { attribute: String, excerpt: String },

    #[error("Event handler attribute \"{attribute}\" must hold exactly one expression, found {count}: {excerpt}")]
    AmbiguousHandler {
        attribute: String,
        count: usize,
        excerpt: String,
    },

    #[error("Placeholder {token} was not found in the parsed template")]
    PlaceholderNotFound { token: String },

    #[error("Template has no content")]
    EmptyTemplate,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("expression {token} failed: {source}")]
    Evaluation {
        token: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("flush requested while a flush is already running")]
    ReentrantFlush,

    #[error("expression {token} is still evaluating; nested evaluation is not supported")]
    NestedEvaluation { token: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Recover a library error carried through a callback's `anyhow::Error`
    pub(crate) fn from_callback(token: &str, source: anyhow::Error) -> Error {
        match source.downcast::<Error>() {
            Ok(err) => err,
            Err(source) => Error::Evaluation {
                token: token.to_string(),
                source,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
