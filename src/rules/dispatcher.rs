//! Rule selection and backend evaluation.
//!
//! # Responsibilities
//! - Store compiled rules in configuration order
//! - Select the first rule matching a request path
//! - Run the rule's backends and combine their results
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) prefix scan (acceptable for typical rule counts)
//! - Backend errors never turn into an authenticated outcome

use std::time::Instant;

use axum::http::request::Parts;

use crate::backend::{Backend, BackendError, BackendRegistry};
use crate::config::{ConfigError, RuleConfig};
use crate::observability::metrics;
use crate::rules::rule::{MatchMode, Rule};

/// Outcome of evaluating a request against the rule set.
#[derive(Debug)]
pub enum Decision {
    /// No rule covers the request path.
    NoMatch,
    /// Rule `rule` granted access; `backend` completed the decision.
    Authenticated { rule: usize, backend: String },
    /// Rule `rule` denied access. `error` is set when a backend failed.
    Denied {
        rule: usize,
        error: Option<BackendError>,
    },
}

impl Decision {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Decision::Authenticated { .. })
    }

    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::NoMatch => "no_match",
            Decision::Authenticated { .. } => "authenticated",
            Decision::Denied { error: None, .. } => "denied",
            Decision::Denied { error: Some(_), .. } => "error",
        }
    }
}

/// Ordered, immutable set of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build every rule and its backends. Fails on the first bad rule.
    pub fn from_config(configs: &[RuleConfig], registry: &BackendRegistry) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(configs.len());

        for (index, config) in configs.iter().enumerate() {
            let wrap = |source: ConfigError| ConfigError::Rule {
                index,
                path: config.path.clone(),
                source: Box::new(source),
            };

            let backends = config
                .backends
                .iter()
                .map(|entry| registry.build(&entry.kind, &entry.options))
                .collect::<Result<Vec<_>, _>>()
                .map_err(wrap)?;

            let rule = Rule::new(config.path.clone(), config.exceptions.clone(), config.mode, backends)
                .map_err(wrap)?;
            rules.push(rule);
        }

        tracing::info!(rules = rules.len(), "Rule set compiled");
        Ok(Self { rules })
    }

    /// First rule matching `path`, with its index.
    pub fn select(&self, path: &str) -> Option<(usize, &Rule)> {
        self.rules.iter().enumerate().find(|(_, rule)| rule.matches(path))
    }

    /// Evaluate a request whose effective path is `path`.
    pub async fn authorize(&self, path: &str, request: &Parts) -> Decision {
        let Some((index, rule)) = self.select(path) else {
            tracing::trace!(path = %path, "No rule matched");
            return Decision::NoMatch;
        };

        let decision = match rule.mode() {
            MatchMode::AnyOf => any_of(index, rule, request).await,
            MatchMode::AllOf => all_of(index, rule, request).await,
        };

        tracing::debug!(
            path = %path,
            rule = index,
            rule_path = %rule.path(),
            outcome = decision.outcome(),
            "Request evaluated"
        );
        decision
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

async fn any_of(index: usize, rule: &Rule, request: &Parts) -> Decision {
    let mut last_error = None;

    for backend in rule.backends() {
        match call(backend.as_ref(), request).await {
            Ok(true) => {
                return Decision::Authenticated {
                    rule: index,
                    backend: backend.name().to_string(),
                };
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(rule = index, backend = backend.name(), error = %e, "Backend failed, trying next");
                last_error = Some(e);
            }
        }
    }

    Decision::Denied {
        rule: index,
        error: last_error,
    }
}

async fn all_of(index: usize, rule: &Rule, request: &Parts) -> Decision {
    let mut last = "";

    for backend in rule.backends() {
        match call(backend.as_ref(), request).await {
            Ok(true) => last = backend.name(),
            Ok(false) => return Decision::Denied { rule: index, error: None },
            Err(e) => {
                tracing::warn!(rule = index, backend = backend.name(), error = %e, "Backend failed");
                return Decision::Denied {
                    rule: index,
                    error: Some(e),
                };
            }
        }
    }

    Decision::Authenticated {
        rule: index,
        backend: last.to_string(),
    }
}

async fn call(backend: &dyn Backend, request: &Parts) -> Result<bool, BackendError> {
    let started = Instant::now();
    let result = backend.authenticate(request).await;
    let label = match &result {
        Ok(true) => "authenticated",
        Ok(false) => "denied",
        Err(e) => e.kind(),
    };
    metrics::record_backend_call(backend.name(), label, started);
    result
}
