//! Reactive template binding
//!
//! Binds markup templates with dynamic slots to observable state. Every
//! slot becomes an expression whose reads are tracked; when a state key
//! changes, only the expressions that read it are re-run and only their
//! bound nodes are patched.
//!
//! ```ignore
//! let dom = Document::shared();
//! let state = State::new().with("a", 1);
//! let s = state.clone();
//! let view = Template::builder()
//!     .lit("<div>")
//!     .dynamic(move || s.get("a"))
//!     .lit("</div>")
//!     .build()
//!     .bind(&dom, &[state.clone()], BinderConfig::default())?;
//! state.set("a", 2)?;
//! assert_eq!(view.html(), "<div>2</div>");
//! ```

pub mod binder;
pub mod bound_node;
pub mod config;
pub mod error;
pub mod expression;
pub mod locator;
pub mod observer;
pub mod scheduler;
pub mod template;
pub mod token;
pub mod tracker;
pub mod view;

pub use binder::TemplateBinder;
pub use config::BinderConfig;
pub use error::{BindingError, Error, Result};
pub use observer::{State, Subscription};
pub use scheduler::{Clock, ManualClock, SystemClock};
pub use template::{Template, TemplateBuilder};
pub use token::PlaceholderToken;
pub use view::{FlushReport, View};

pub use htmel_dom::{Document, Dom, Function, NodeId, Value};
