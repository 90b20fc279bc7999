//! Dependency Tracker
//!
//! Records which state keys each expression read during its evaluations.
//! The map is keyed by qualified property name: the bare key when a single
//! state is bound, `"<state index>.<key>"` otherwise.
//!
//! By default entries only accumulate: a key an expression stopped reading
//! keeps triggering it. Spurious re-evaluation is harmless, a missed one is
//! not. With pruning enabled, an expression's previous reads are forgotten
//! each time it starts evaluating.

use indexmap::{IndexMap, IndexSet};

/// Index of an expression within its view (equal to its template slot)
pub type ExpressionId = usize;

#[derive(Debug, Default)]
pub struct DependencyTracker {
    /// key -> expressions that read it
    subscribers: IndexMap<String, IndexSet<ExpressionId>>,
    /// expression -> keys it read
    dependencies: IndexMap<ExpressionId, IndexSet<String>>,
    active: Option<ExpressionId>,
    prune_stale: bool,
}

impl DependencyTracker {
    pub fn new(prune_stale: bool) -> Self {
        DependencyTracker {
            prune_stale,
            ..Default::default()
        }
    }

    /// The expression reads are currently attributed to
    pub fn active(&self) -> Option<ExpressionId> {
        self.active
    }

    /// Start attributing reads to `id`
    pub fn begin(&mut self, id: ExpressionId) {
        if self.prune_stale {
            self.clear_dependencies(id);
        }
        self.active = Some(id);
    }

    /// Stop attributing reads
    pub fn end(&mut self) {
        self.active = None;
    }

    /// Record a read of `key`. Reads outside an evaluation are ignored.
    pub fn record(&mut self, key: &str) {
        let Some(id) = self.active else {
            return;
        };
        if self
            .subscribers
            .entry(key.to_string())
            .or_default()
            .insert(id)
        {
            tracing::trace!(key, expression = id, "recorded dependency");
        }
        self.dependencies
            .entry(id)
            .or_default()
            .insert(key.to_string());
    }

    /// Expressions depending on `key`, in first-read order
    pub fn expressions_for(&self, key: &str) -> Option<&IndexSet<ExpressionId>> {
        self.subscribers.get(key).filter(|set| !set.is_empty())
    }

    /// Keys `id` depends on
    pub fn dependencies_of(&self, id: ExpressionId) -> Vec<String> {
        self.dependencies
            .get(&id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forget every read recorded for `id`
    pub fn clear_dependencies(&mut self, id: ExpressionId) {
        let Some(keys) = self.dependencies.shift_remove(&id) else {
            return;
        };
        for key in keys {
            if let Some(set) = self.subscribers.get_mut(&key) {
                set.shift_remove(&id);
                if set.is_empty() {
                    self.subscribers.shift_remove(&key);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Qualified key for `key` of the state at `state_index`
pub fn qualify(state_index: usize, state_count: usize, key: &str) -> String {
    if state_count > 1 {
        format!("{}.{}", state_index, key)
    } else {
        key.to_string()
    }
}
