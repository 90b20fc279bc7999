//! Binder Configuration
//!
//! Loaded from JSON or built in code; every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Upper bound on flushes per second; 0 disables rate limiting
    pub max_fps: u32,
    /// Attribute name prefix that marks an event handler (`onclick`)
    pub event_prefix: String,
    /// Whether placeholders may appear in attribute names
    pub allow_attribute_name_bindings: bool,
    /// Drop an expression's previous reads before it is evaluated again
    pub prune_stale_dependencies: bool,
    /// Source name reported in markup diagnostics
    pub template_url: String,
}

impl Default for BinderConfig {
    fn default() -> Self {
        BinderConfig {
            max_fps: 60,
            event_prefix: "on".to_string(),
            allow_attribute_name_bindings: true,
            prune_stale_dependencies: false,
            template_url: "template.html".to_string(),
        }
    }
}

impl BinderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BinderConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_prefix.is_empty() {
            return Err(Error::Config("event_prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// Minimum time between two flushes
    pub fn frame_interval(&self) -> Duration {
        if self.max_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(1000 / u64::from(self.max_fps))
        }
    }

    pub fn with_max_fps(mut self, max_fps: u32) -> Self {
        self.max_fps = max_fps;
        self
    }

    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    pub fn with_attribute_name_bindings(mut self, allow: bool) -> Self {
        self.allow_attribute_name_bindings = allow;
        self
    }

    pub fn with_stale_dependency_pruning(mut self, prune: bool) -> Self {
        self.prune_stale_dependencies = prune;
        self
    }

    /// Event name for an attribute, if the attribute is an event target.
    /// Matching is ASCII case-insensitive and the event name is lowercased.
    pub fn event_name(&self, attribute: &str) -> Option<String> {
        let lower = attribute.to_ascii_lowercase();
        let prefix = self.event_prefix.to_ascii_lowercase();
        lower
            .strip_prefix(prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}
