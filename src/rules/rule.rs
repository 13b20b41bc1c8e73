//! A single authentication rule.
//!
//! # Responsibilities
//! - Match the request path prefix (case-sensitive, byte-wise)
//! - Exclude paths under any exception prefix
//! - Hold the ordered backend chain and its combination mode

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::config::ConfigError;

/// How the results of a rule's backends are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The first backend that authenticates grants access.
    #[default]
    AnyOf,
    /// Every backend has to authenticate.
    AllOf,
}

/// Path scope with exceptions and the backends guarding it.
#[derive(Debug, Clone)]
pub struct Rule {
    path: String,
    exceptions: Vec<String>,
    mode: MatchMode,
    backends: Vec<Arc<dyn Backend>>,
}

impl Rule {
    /// Create a rule. The path must be non-empty and at least one backend given.
    pub fn new(
        path: impl Into<String>,
        exceptions: Vec<String>,
        mode: MatchMode,
        backends: Vec<Arc<dyn Backend>>,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.is_empty() {
            return Err(ConfigError::InvalidRule("path is a required parameter".into()));
        }
        if backends.is_empty() {
            return Err(ConfigError::InvalidRule("at least one backend required".into()));
        }
        Ok(Self {
            path,
            exceptions,
            mode,
            backends,
        })
    }

    /// True if `path` is under this rule and not under any exception.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path) && !self.exceptions.iter().any(|e| path.starts_with(e.as_str()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }
}
