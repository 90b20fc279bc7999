//! Expressions
//!
//! One expression per template slot: a callback re-run when its
//! dependencies change, a static value, or an event handler.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use htmel_dom::{Function, Value};

use crate::error::{Error, Result};
use crate::token::PlaceholderToken;
use crate::tracker::{DependencyTracker, ExpressionId};

/// Zero-argument expression callback
pub type Callback = Rc<dyn Fn() -> anyhow::Result<Value>>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExpressionFlags: u8 {
        /// Evaluated once at bind time, never again
        const STATIC = 1 << 0;
        /// Bound to an event attribute; only invoked by event dispatch
        const EVENT_HANDLER = 1 << 1;
    }
}

/// What an expression computes
#[derive(Clone)]
pub enum Evaluator {
    Static(Value),
    Dynamic(Callback),
    Handler(Function),
}

impl Evaluator {
    /// Slot kind shown in template excerpts
    pub fn describe(&self) -> &'static str {
        match self {
            Evaluator::Static(_) => "value",
            Evaluator::Dynamic(_) => "dynamic",
            Evaluator::Handler(_) => "handler",
        }
    }

    /// Compute the expression's next result.
    ///
    /// Dynamic callbacks run with read attribution active for `id`.
    /// Handlers are not invoked; the result is the handler itself.
    pub fn execute(
        &self,
        id: ExpressionId,
        token: &PlaceholderToken,
        tracker: &RefCell<DependencyTracker>,
    ) -> Result<Value> {
        match self {
            Evaluator::Static(value) => Ok(value.clone()),
            Evaluator::Handler(handler) => Ok(Value::Function(handler.clone())),
            Evaluator::Dynamic(callback) => {
                let _guard = EvaluationGuard::enter(token)?;
                tracker.borrow_mut().begin(id);
                let result = callback();
                tracker.borrow_mut().end();
                tracing::trace!(token = %token, ok = result.is_ok(), "evaluated expression");
                result.map_err(|source| Error::from_callback(token.as_str(), source))
            }
        }
    }

    /// The event-position form of this evaluator. Callbacks become handlers
    /// that ignore the event arguments.
    pub(crate) fn into_handler(self) -> Evaluator {
        match self {
            Evaluator::Dynamic(callback) => {
                Evaluator::Handler(Function::new(move |_args: &[Value]| callback()))
            }
            Evaluator::Static(Value::Function(handler)) => Evaluator::Handler(handler),
            other => other,
        }
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Evaluator::Dynamic(_) => f.write_str("Dynamic"),
            Evaluator::Handler(handler) => f.debug_tuple("Handler").field(handler).finish(),
        }
    }
}

#[derive(Debug)]
pub struct Expression {
    pub id: ExpressionId,
    pub token: PlaceholderToken,
    pub evaluator: Evaluator,
    pub flags: ExpressionFlags,
    pub last_result: Value,
    /// Index of the bound node this expression patches
    pub owner: usize,
}

impl Expression {
    pub fn new(id: ExpressionId, token: PlaceholderToken, evaluator: Evaluator, owner: usize) -> Self {
        let flags = match evaluator {
            Evaluator::Static(_) => ExpressionFlags::STATIC,
            _ => ExpressionFlags::empty(),
        };
        Expression {
            id,
            token,
            evaluator,
            flags,
            last_result: Value::Undefined,
            owner,
        }
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(ExpressionFlags::STATIC)
    }

    pub fn is_event_handler(&self) -> bool {
        self.flags.contains(ExpressionFlags::EVENT_HANDLER)
    }

    /// Permanently mark this expression as an event handler
    pub fn mark_event_handler(&mut self) {
        let evaluator = std::mem::replace(&mut self.evaluator, Evaluator::Static(Value::Undefined));
        self.evaluator = evaluator.into_handler();
        self.flags.insert(ExpressionFlags::EVENT_HANDLER);
    }
}

thread_local! {
    static ACTIVE_EVALUATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Token of the expression currently evaluating on this thread, if any
pub fn active_evaluation() -> Option<String> {
    ACTIVE_EVALUATION.with(|active| active.borrow().clone())
}

/// Marks an expression callback as running. Only one may run at a time
/// per thread, across every view.
struct EvaluationGuard;

impl EvaluationGuard {
    fn enter(token: &PlaceholderToken) -> Result<Self> {
        if active_evaluation().is_some() {
            return Err(Error::NestedEvaluation {
                token: token.to_string(),
            });
        }
        ACTIVE_EVALUATION.with(|active| *active.borrow_mut() = Some(token.to_string()));
        Ok(EvaluationGuard)
    }
}

impl Drop for EvaluationGuard {
    fn drop(&mut self) {
        ACTIVE_EVALUATION.with(|active| *active.borrow_mut() = None);
    }
}
