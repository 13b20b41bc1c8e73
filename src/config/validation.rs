//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check rule invariants (non-empty path, at least one backend)
//! - Check values that end up in HTTP headers or socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Backend options are checked later by the backend constructors

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.gate.realm.is_empty() {
        errors.push(ValidationError::new("gate.realm", "must not be empty"));
    } else if HeaderValue::from_str(&challenge_value(&config.gate.realm)).is_err() {
        errors.push(ValidationError::new(
            "gate.realm",
            "contains characters not allowed in a header",
        ));
    }

    if HeaderName::from_bytes(config.gate.forwarded_uri_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "gate.forwarded_uri_header",
            format!("{:?} is not a valid header name", config.gate.forwarded_uri_header),
        ));
    }

    for (i, rule) in config.rules.iter().enumerate() {
        if rule.path.is_empty() {
            errors.push(ValidationError::new(format!("rules[{i}].path"), "path is a required parameter"));
        }
        if rule.exceptions.iter().any(String::is_empty) {
            errors.push(ValidationError::new(
                format!("rules[{i}].except"),
                "an empty exception would exclude every path",
            ));
        }
        if rule.backends.is_empty() {
            errors.push(ValidationError::new(
                format!("rules[{i}].backends"),
                "at least one backend required",
            ));
        }
        for (j, backend) in rule.backends.iter().enumerate() {
            if backend.kind.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("rules[{i}].backends[{j}].type"),
                    "must name a registered backend",
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Value of the `WWW-Authenticate` header for a realm.
pub fn challenge_value(realm: &str) -> String {
    format!("Basic realm=\"{}\"", realm.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BackendEntry, RuleConfig};

    fn rule(path: &str, backends: usize) -> RuleConfig {
        RuleConfig {
            path: path.into(),
            backends: (0..backends)
                .map(|_| BackendEntry {
                    kind: "gitlab".into(),
                    options: "url=https://git.example.com/".into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.gate.realm = String::new();
        config.rules.push(rule("", 1));
        config.rules.push(rule("/ok", 0));

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "gate.realm", "rules[0].path", "rules[1].backends"]
        );
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "localhost".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn test_rejects_bad_header_settings() {
        let mut config = GatewayConfig::default();
        config.gate.realm = "line\nbreak".into();
        config.gate.forwarded_uri_header = "not a header".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_empty_exception_rejected() {
        let mut config = GatewayConfig::default();
        let mut r = rule("/a", 1);
        r.exceptions.push(String::new());
        config.rules.push(r);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "rules[0].except");
    }

    #[test]
    fn test_challenge_value_escapes_quotes() {
        assert_eq!(challenge_value("a\"b"), "Basic realm=\"a\\\"b\"");
    }
}
