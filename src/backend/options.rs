//! Backend option strings.
//!
//! A backend directive carries a single argument of the form
//! `key=value,key=value`. Whitespace around pairs is ignored, empty segments
//! are skipped and a repeated key keeps its last value. Values may contain
//! `=` (only the first one separates key from value) but not `,`.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::ConfigError;

/// Parsed backend options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOptions {
    values: HashMap<String, String>,
}

impl BackendOptions {
    /// Parse a raw option string.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();

        for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| ConfigError::MalformedOptions {
                    segment: segment.to_string(),
                })?;
            values.insert(key.to_string(), value.to_string());
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of a mandatory option.
    pub fn required(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingOption {
            key: key.to_string(),
        })
    }

    /// Duration option in humantime syntax (`30s`, `1m30s`, `500ms`).
    pub fn duration(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        self.get(key)
            .map(|value| {
                humantime::parse_duration(value).map_err(|e| ConfigError::InvalidOption {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Boolean option.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|value| {
                parse_bool(value).ok_or_else(|| ConfigError::InvalidOption {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "expected a boolean".to_string(),
                })
            })
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
