//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::rules::MatchMode;

/// Root configuration for the authentication gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Host-side policy around the rule engine.
    pub gate: GateConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Authentication rules, evaluated in order.
    pub rules: Vec<RuleConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// What to do with requests that no rule covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Let the request through untouched.
    #[default]
    Allow,
    /// Challenge the request like a denied one.
    Deny,
}

/// Host-side gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    pub realm: String,

    /// Policy for requests that match no rule.
    pub unmatched: UnmatchedPolicy,

    /// Header carrying the original request URI when running as a
    /// forward-auth service behind another proxy.
    pub forwarded_uri_header: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            realm: "Restricted".to_string(),
            unmatched: UnmatchedPolicy::Allow,
            forwarded_uri_header: "x-forwarded-uri".to_string(),
        }
    }
}

/// Timeout configuration for the gateway's own listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to reach a decision) in seconds.
    /// Keep it above the slowest backend timeout.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A single authentication rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Path prefix the rule applies to.
    pub path: String,

    /// Path prefixes excluded from the rule.
    #[serde(rename = "except")]
    pub exceptions: Vec<String>,

    /// How the backend results are combined.
    pub mode: MatchMode,

    /// Backends consulted for this rule, in order.
    pub backends: Vec<BackendEntry>,
}

/// A backend directive: registered type name plus its option string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendEntry {
    /// Registered backend type (e.g. "gitlab").
    #[serde(rename = "type")]
    pub kind: String,

    /// Comma separated `key=value` options handed to the constructor.
    #[serde(default)]
    pub options: String,
}
