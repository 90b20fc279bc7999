//! Property Observer
//!
//! [`State`] is a key/value container whose every read and write is
//! reported to the registered observers. Keys need no declaration: a key
//! first written after observers were registered is reported like any other.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. Every `set` notifies, even when the new value equals the old one.
//! 3. `get` reports the read before returning the value.
//! 4. No internal borrow is held while an observer runs, so observers may
//!    read or write the same state.
//! 5. Dropping a [`Subscription`] removes its observer pair.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use htmel_dom::Value;
use indexmap::IndexMap;

use crate::error::Result;

type ReadHook = Rc<dyn Fn(&str)>;
type WriteHook = Rc<dyn Fn(&str, &Value) -> Result<()>>;

struct ObserverEntry {
    id: u64,
    on_read: ReadHook,
    on_write: WriteHook,
}

struct StateInner {
    values: RefCell<IndexMap<String, Value>>,
    observers: RefCell<Vec<ObserverEntry>>,
    next_id: Cell<u64>,
}

/// Observable state object. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct State {
    inner: Rc<StateInner>,
}

impl State {
    pub fn new() -> Self {
        State {
            inner: Rc::new(StateInner {
                values: RefCell::new(IndexMap::new()),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Seed a state without notifying anyone
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inner
            .values
            .borrow_mut()
            .insert(key.into(), value.into());
        self
    }

    /// Read `key`, reporting the read. Missing keys read as `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        let value = self.peek(key);
        for on_read in self.read_hooks() {
            on_read(key);
        }
        value
    }

    /// Read `key` without reporting the read
    pub fn peek(&self, key: &str) -> Value {
        self.inner
            .values
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Write `key` and report the write to every observer.
    ///
    /// Every observer runs even if an earlier one fails; the first failure
    /// is returned.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.inner
            .values
            .borrow_mut()
            .insert(key.to_string(), value.clone());

        let mut first_error = None;
        for on_write in self.write_hooks() {
            if let Err(err) = on_write(key, &value) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Read-modify-write of a single key
    pub fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Value) -> Value,
    {
        let current = self.get(key);
        self.set(key, f(current))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.values.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.values.borrow().keys().cloned().collect()
    }

    /// Register an observer pair; it stays registered until the returned
    /// subscription is dropped
    pub fn observe<R, W>(&self, on_read: R, on_write: W) -> Subscription
    where
        R: Fn(&str) + 'static,
        W: Fn(&str, &Value) -> Result<()> + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.observers.borrow_mut().push(ObserverEntry {
            id,
            on_read: Rc::new(on_read),
            on_write: Rc::new(on_write),
        });
        Subscription {
            state: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    fn read_hooks(&self) -> Vec<ReadHook> {
        self.inner
            .observers
            .borrow()
            .iter()
            .map(|o| o.on_read.clone())
            .collect()
    }

    fn write_hooks(&self) -> Vec<WriteHook> {
        self.inner
            .observers
            .borrow()
            .iter()
            .map(|o| o.on_write.clone())
            .collect()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("values", &*self.inner.values.borrow())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(State::new(), |state, (k, v)| state.with(k, v))
    }
}

/// RAII guard for an observer pair registered with [`State::observe`]
pub struct Subscription {
    state: Weak<StateInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.state.upgrade() {
            inner.observers.borrow_mut().retain(|o| o.id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
