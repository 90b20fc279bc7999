//! Templates
//!
//! A template is a sequence of literal markup fragments with a slot
//! between each pair of neighbours. Slots are dynamic callbacks, static
//! values or event handlers.

use std::fmt;
use std::rc::Rc;

use htmel_dom::{Dom, Function, Value};

use crate::binder::TemplateBinder;
use crate::config::BinderConfig;
use crate::error::Result;
use crate::expression::Evaluator;
use crate::observer::State;
use crate::scheduler::{Clock, SystemClock};
use crate::view::View;

pub struct Template {
    fragments: Vec<String>,
    slots: Vec<Evaluator>,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Literal markup without any slot
    pub fn literal(markup: impl Into<String>) -> Self {
        Template {
            fragments: vec![markup.into()],
            slots: Vec::new(),
        }
    }

    /// Literal fragments; always one more than there are slots
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Evaluator>) {
        (self.fragments, self.slots)
    }

    /// Bind against `states` and run the initial render
    pub fn bind(self, dom: &Dom, states: &[State], config: BinderConfig) -> Result<View> {
        self.bind_with_clock(dom, states, config, Rc::new(SystemClock))
    }

    /// Like [`bind`](Self::bind) with a custom time source for the scheduler
    pub fn bind_with_clock(
        self,
        dom: &Dom,
        states: &[State],
        config: BinderConfig,
        clock: Rc<dyn Clock>,
    ) -> Result<View> {
        TemplateBinder::new(dom.clone(), config, clock).bind(self, states)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("fragments", &self.fragments)
            .field("slots", &self.slots)
            .finish()
    }
}

#[derive(Default)]
pub struct TemplateBuilder {
    fragments: Vec<String>,
    slots: Vec<Evaluator>,
    current: String,
}

impl TemplateBuilder {
    /// Append literal markup
    pub fn lit(mut self, markup: &str) -> Self {
        self.current.push_str(markup);
        self
    }

    /// Slot re-evaluated whenever a state key it read changes
    pub fn dynamic<F>(self, f: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        self.slot(Evaluator::Dynamic(Rc::new(move || Ok(f()))))
    }

    /// Fallible variant of [`dynamic`](Self::dynamic)
    pub fn try_dynamic<F>(self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + 'static,
    {
        self.slot(Evaluator::Dynamic(Rc::new(f)))
    }

    /// Slot bound once and never re-evaluated
    pub fn value(self, value: impl Into<Value>) -> Self {
        self.slot(Evaluator::Static(value.into()))
    }

    /// Callable slot receiving event arguments; in an event attribute it
    /// becomes the listener, elsewhere it is assigned as a property
    pub fn handler<F>(self, f: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    {
        self.slot(Evaluator::Handler(Function::new(f)))
    }

    fn slot(mut self, evaluator: Evaluator) -> Self {
        self.fragments.push(std::mem::take(&mut self.current));
        self.slots.push(evaluator);
        self
    }

    pub fn build(mut self) -> Template {
        self.fragments.push(self.current);
        Template {
            fragments: self.fragments,
            slots: self.slots,
        }
    }
}
