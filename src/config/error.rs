//! Configuration and construction errors.
//!
//! Everything in here is fatal: a `ConfigError` aborts startup (or, on hot
//! reload, keeps the previous rule set in force).

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Error raised while loading configuration or constructing backends.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Semantic validation failed.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A required backend option is absent.
    #[error("{key} is a required parameter")]
    MissingOption { key: String },

    /// A backend option is present but its value cannot be used.
    #[error("unable to parse {key} {value}: {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    /// The option string itself is not a list of `key=value` pairs.
    #[error("malformed backend options: {segment:?} is not a key=value pair")]
    MalformedOptions { segment: String },

    /// A backend type name was registered twice.
    #[error("backend {0} is already registered")]
    DuplicateBackend(String),

    /// A backend type name was never registered.
    #[error("unknown backend {0}")]
    UnknownBackend(String),

    /// The outbound HTTP client for a backend could not be built.
    #[error("unable to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A rule violates its structural invariants.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Building rule number `index` failed.
    #[error("rule #{index} ({path}): {source}")]
    Rule {
        index: usize,
        path: String,
        #[source]
        source: Box<ConfigError>,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::new("rules[0].path", "must not be empty"),
            ValidationError::new("gate.realm", "must not be empty"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: rules[0].path: must not be empty, gate.realm: must not be empty"
        );
    }

    #[test]
    fn test_option_errors_name_key_and_value() {
        let err = ConfigError::InvalidOption {
            key: "timeout".into(),
            value: "soon".into(),
            reason: "expected number at 0".into(),
        };
        let text = err.to_string();
        assert!(text.contains("timeout"));
        assert!(text.contains("soon"));
    }
}
