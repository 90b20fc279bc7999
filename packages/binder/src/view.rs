//! Views
//!
//! A [`View`] is the live result of binding a template: it owns the
//! expressions and bound nodes, keeps the dependency map, and runs flushes
//! when observed state changes.
//!
//! # Reentrancy
//!
//! - A state write during a flush is queued; a trailing flush is scheduled
//!   when the running flush ends.
//! - [`View::flush`] during a flush of the same view fails with
//!   [`Error::ReentrantFlush`].
//! - A flush that would start while any expression is evaluating fails
//!   with [`Error::NestedEvaluation`]; a write made from inside an
//!   evaluation defers its flush to the next poll instead.
//!
//! # Failures
//!
//! A batch is all or nothing. The first failing expression aborts it:
//! later expressions are not run, no bound node is patched and every
//! expression keeps its previous result. The batch's keys are consumed and
//! the error goes to whoever triggered the flush.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use htmel_dom::{dispatch_event, inner_html, Dom, Function, NodeId, Value};
use indexmap::IndexSet;

use crate::bound_node::{BoundNode, Resolved};
use crate::config::BinderConfig;
use crate::error::{Error, Result};
use crate::expression::{active_evaluation, Expression};
use crate::observer::Subscription;
use crate::scheduler::RenderScheduler;
use crate::token::PlaceholderToken;
use crate::tracker::{DependencyTracker, ExpressionId};

/// Summary of one flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Expressions re-evaluated
    pub evaluated: usize,
    /// Bound nodes patched
    pub patched: usize,
    /// Changed keys no expression depends on
    pub unmapped: Vec<String>,
}

pub(crate) struct ViewCore {
    pub(crate) dom: Dom,
    pub(crate) config: BinderConfig,
    pub(crate) fragment: NodeId,
    pub(crate) expressions: RefCell<Vec<Expression>>,
    pub(crate) bound_nodes: RefCell<Vec<BoundNode>>,
    pub(crate) tracker: RefCell<DependencyTracker>,
    pub(crate) scheduler: RefCell<RenderScheduler>,
    pub(crate) this: Weak<ViewCore>,
}

impl ViewCore {
    pub(crate) fn record_read(&self, key: &str) {
        self.tracker.borrow_mut().record(key);
    }

    pub(crate) fn notify(&self, key: &str) -> Result<()> {
        let flush_now = self.scheduler.borrow_mut().notify(key);
        if !flush_now {
            return Ok(());
        }
        if active_evaluation().is_some() {
            self.scheduler.borrow_mut().defer();
            return Ok(());
        }
        self.flush().map(|_| ())
    }

    pub(crate) fn flush(&self) -> Result<FlushReport> {
        if self.scheduler.borrow().is_flushing() {
            return Err(Error::ReentrantFlush);
        }
        if let Some(token) = active_evaluation() {
            return Err(Error::NestedEvaluation { token });
        }

        if self.scheduler.borrow_mut().settle_if_idle() {
            return Ok(FlushReport::default());
        }
        let keys = self.scheduler.borrow_mut().begin_flush();
        let result = self.flush_keys(&keys);
        self.scheduler.borrow_mut().end_flush();
        result
    }

    fn flush_keys(&self, keys: &IndexSet<String>) -> Result<FlushReport> {
        let mut report = FlushReport::default();
        let mut affected: IndexSet<ExpressionId> = IndexSet::new();
        {
            let tracker = self.tracker.borrow();
            for key in keys {
                match tracker.expressions_for(key) {
                    Some(ids) => affected.extend(ids.iter().copied()),
                    None => {
                        tracing::warn!(key = %key, "changed property has no dependent expression");
                        report.unmapped.push(key.clone());
                    }
                }
            }
        }

        let (evaluated, patched) = self.run_batch(&affected)?;
        report.evaluated = evaluated;
        report.patched = patched;
        tracing::debug!(
            keys = keys.len(),
            evaluated,
            patched,
            unmapped = report.unmapped.len(),
            "flushed view"
        );
        Ok(report)
    }

    /// Evaluate and patch every expression once
    pub(crate) fn render_all(&self) -> Result<()> {
        let ids: IndexSet<ExpressionId> = (0..self.expressions.borrow().len()).collect();
        self.scheduler.borrow_mut().begin_initial_render();
        let result = self.run_batch(&ids);
        self.scheduler.borrow_mut().end_flush();
        result.map(|_| ())
    }

    /// Evaluate `ids`, then commit their results and patch their owners.
    /// Returns (evaluated, patched).
    fn run_batch(&self, ids: &IndexSet<ExpressionId>) -> Result<(usize, usize)> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let (token, evaluator) = {
                let expressions = self.expressions.borrow();
                let expression = &expressions[id];
                (expression.token.clone(), expression.evaluator.clone())
            };
            let value = evaluator.execute(id, &token, &self.tracker)?;
            results.push((id, value));
        }

        let mut owners: IndexSet<usize> = IndexSet::new();
        {
            let mut expressions = self.expressions.borrow_mut();
            for (id, value) in results {
                owners.insert(expressions[id].owner);
                expressions[id].last_result = value;
            }
        }

        self.patch(&owners);
        Ok((ids.len(), owners.len()))
    }

    fn patch(&self, owners: &IndexSet<usize>) {
        let expressions = self.expressions.borrow();
        let mut bound_nodes = self.bound_nodes.borrow_mut();
        let mut doc = self.dom.borrow_mut();
        let make_listener = |id: ExpressionId| self.make_listener(&expressions[id].token, id);

        for &index in owners {
            let node = &mut bound_nodes[index];
            let values: Vec<Resolved<'_>> = node
                .expressions
                .iter()
                .map(|&id| Resolved {
                    id,
                    token: expressions[id].token.as_str(),
                    value: &expressions[id].last_result,
                })
                .collect();
            tracing::trace!(bound_node = index, kind = ?node.kind(), "patching bound node");
            node.update(&mut doc, &values, &make_listener);
        }
    }

    /// Listener calling the expression's current result with the event
    /// arguments. A callable returned by the handler is called in turn with
    /// the same arguments, one level deep.
    fn make_listener(&self, token: &PlaceholderToken, id: ExpressionId) -> Function {
        let core = self.this.clone();
        let token = token.to_string();
        Function::new(move |args: &[Value]| {
            let Some(core) = core.upgrade() else {
                return Ok(Value::Undefined);
            };
            let handler = core.expressions.borrow()[id].last_result.clone();
            invoke_handler(&token, &handler, args)
                .map_err(|source| anyhow::Error::new(Error::from_callback(&token, source)))
        })
    }
}

fn invoke_handler(token: &str, handler: &Value, args: &[Value]) -> anyhow::Result<Value> {
    let Value::Function(handler) = handler else {
        tracing::warn!(token, "event handler is not callable");
        return Ok(Value::Undefined);
    };
    match handler.call(args)? {
        Value::Function(next) => next.call(args),
        other => Ok(other),
    }
}

/// A bound template
pub struct View {
    core: Rc<ViewCore>,
    _subscriptions: Vec<Subscription>,
}

impl View {
    pub(crate) fn new(core: Rc<ViewCore>, subscriptions: Vec<Subscription>) -> Self {
        View {
            core,
            _subscriptions: subscriptions,
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.core.dom
    }

    pub fn config(&self) -> &BinderConfig {
        &self.core.config
    }

    /// Fragment holding the top-level nodes
    pub fn fragment(&self) -> NodeId {
        self.core.fragment
    }

    /// Every top-level node, in order
    pub fn roots(&self) -> Vec<NodeId> {
        self.core.dom.borrow().children(self.core.fragment).to_vec()
    }

    /// The first top-level element. Logs a warning when the template has
    /// more than one.
    pub fn root(&self) -> Option<NodeId> {
        let elements = self.core.dom.borrow().element_children(self.core.fragment);
        if elements.len() > 1 {
            tracing::warn!(
                count = elements.len(),
                "template has more than one top-level element; returning the first"
            );
        }
        elements.first().copied()
    }

    /// Serialized top-level nodes
    pub fn html(&self) -> String {
        inner_html(&self.core.dom.borrow(), self.core.fragment)
    }

    /// Flush pending changes now, ignoring the rate limit
    pub fn flush(&self) -> Result<FlushReport> {
        self.core.flush()
    }

    /// Run the trailing flush if it is due
    pub fn poll(&self) -> Result<Option<FlushReport>> {
        if !self.core.scheduler.borrow().is_due() {
            return Ok(None);
        }
        self.core.flush().map(Some)
    }

    /// When the scheduled trailing flush becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.core.scheduler.borrow().next_deadline()
    }

    /// Changed keys waiting for a flush
    pub fn pending_keys(&self) -> Vec<String> {
        self.core.scheduler.borrow().pending().iter().cloned().collect()
    }

    /// Dispatch `event` on `target`, returning the last listener's result
    pub fn dispatch(&self, target: NodeId, event: &str, args: &[Value]) -> Result<Option<Value>> {
        dispatch_event(&self.core.dom, target, event, args)
            .map_err(|source| Error::from_callback(event, source))
    }

    /// Slots whose expressions depend on the qualified `key`
    pub fn dependencies_of(&self, key: &str) -> Vec<usize> {
        self.core
            .tracker
            .borrow()
            .expressions_for(key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Latest result of the expression in `slot`
    pub fn last_result(&self, slot: usize) -> Option<Value> {
        self.core
            .expressions
            .borrow()
            .get(slot)
            .map(|e| e.last_result.clone())
    }

    pub fn token(&self, slot: usize) -> Option<PlaceholderToken> {
        self.core.expressions.borrow().get(slot).map(|e| e.token.clone())
    }

    pub fn is_event_handler(&self, slot: usize) -> bool {
        self.core
            .expressions
            .borrow()
            .get(slot)
            .is_some_and(Expression::is_event_handler)
    }

    /// Node currently standing in for the binding of `slot`
    pub fn target_of(&self, slot: usize) -> Option<NodeId> {
        let owner = self.core.expressions.borrow().get(slot)?.owner;
        self.core.bound_nodes.borrow().get(owner).map(BoundNode::target)
    }

    pub fn bound_node_count(&self) -> usize {
        self.core.bound_nodes.borrow().len()
    }
}
