//! Host-side policy around the rule engine.
//!
//! # Responsibilities
//! - Turn a rule-set `Decision` into allow / challenge
//! - Apply the unmatched-request policy
//! - Build the `401` + `WWW-Authenticate` challenge
//! - Work out the effective path when running as a forward-auth service
//!
//! # Design Decisions
//! - Fail closed: a decision carrying an error is always a challenge
//! - The gate is swapped as a whole on reload, never mutated

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::{header::WWW_AUTHENTICATE, request::Parts, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use crate::backend::BackendRegistry;
use crate::config::validation::{challenge_value, ValidationError};
use crate::config::{ConfigError, GateConfig, GatewayConfig, UnmatchedPolicy};
use crate::observability::metrics;
use crate::rules::{Decision, RuleSet};

/// Gate shared between the request path and the reload task.
pub type SharedGate = Arc<ArcSwap<Gate>>;

/// What the host should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Challenge,
}

/// Compiled rules plus host policy.
#[derive(Debug)]
pub struct Gate {
    rules: RuleSet,
    unmatched: UnmatchedPolicy,
    challenge: HeaderValue,
    forwarded_uri_header: HeaderName,
}

impl Gate {
    pub fn new(rules: RuleSet, config: &GateConfig) -> Result<Self, ConfigError> {
        let challenge = HeaderValue::from_str(&challenge_value(&config.realm)).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::new(
                "gate.realm",
                "contains characters not allowed in a header",
            )])
        })?;
        let forwarded_uri_header =
            HeaderName::from_bytes(config.forwarded_uri_header.as_bytes()).map_err(|_| {
                ConfigError::Validation(vec![ValidationError::new(
                    "gate.forwarded_uri_header",
                    "is not a valid header name",
                )])
            })?;

        Ok(Self {
            rules,
            unmatched: config.unmatched,
            challenge,
            forwarded_uri_header,
        })
    }

    /// Build rules through `registry` and wrap them with the gate policy.
    pub fn from_config(config: &GatewayConfig, registry: &BackendRegistry) -> Result<Self, ConfigError> {
        let rules = RuleSet::from_config(&config.rules, registry)?;
        Self::new(rules, &config.gate)
    }

    pub fn shared(self) -> SharedGate {
        Arc::new(ArcSwap::from_pointee(self))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate a request whose effective path is `path`.
    pub async fn check(&self, path: &str, request: &Parts) -> Verdict {
        let decision = self.rules.authorize(path, request).await;
        metrics::record_decision(decision.outcome());

        match decision {
            Decision::Authenticated { .. } => Verdict::Allow,
            Decision::NoMatch => match self.unmatched {
                UnmatchedPolicy::Allow => Verdict::Allow,
                UnmatchedPolicy::Deny => Verdict::Challenge,
            },
            Decision::Denied { rule, error: Some(e) } => {
                tracing::warn!(path = %path, rule, error = %e, "Access denied after backend error");
                Verdict::Challenge
            }
            Decision::Denied { rule, error: None } => {
                tracing::debug!(path = %path, rule, "Access denied");
                Verdict::Challenge
            }
        }
    }

    /// Path named by the forwarded-URI header, else the request's own path.
    /// Any query string is dropped.
    pub fn forwarded_path<'a>(&self, request: &'a Parts) -> &'a str {
        request
            .headers
            .get(&self.forwarded_uri_header)
            .and_then(|v| v.to_str().ok())
            .and_then(|uri| uri.split(['?', '#']).next())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| request.uri.path())
    }

    /// `401 Unauthorized` with the Basic-Auth challenge.
    pub fn challenge_response(&self) -> Response {
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .header(WWW_AUTHENTICATE, self.challenge.clone())
            .body(Body::empty())
            .unwrap_or_else(|_| {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::UNAUTHORIZED;
                response
            })
    }
}
