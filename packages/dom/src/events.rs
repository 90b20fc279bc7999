//! Events
//!
//! Listener registration lives on elements; dispatch runs listeners outside
//! of any document borrow so they may freely mutate the tree or state.

use crate::document::Dom;
use crate::node::NodeId;
use crate::value::{Function, Value};

pub type Listener = Function;

/// Dispatch `event` on `target`, invoking its listeners in registration order.
///
/// Returns the result of the last listener, or `None` if no listener is
/// registered for the event.
pub fn dispatch_event(
    dom: &Dom,
    target: NodeId,
    event: &str,
    args: &[Value],
) -> anyhow::Result<Option<Value>> {
    let listeners = dom.borrow().listeners(target, event);
    tracing::trace!(event, node = target.index(), count = listeners.len(), "dispatching event");

    let mut last = None;
    for listener in listeners {
        last = Some(listener.call(args)?);
    }
    Ok(last)
}
