//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::config::validation::validate_config;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UnmatchedPolicy;
    use crate::rules::MatchMode;
    use std::io::Write;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:9000"

[gate]
realm = "Registry"
unmatched = "deny"

[[rules]]
path = "/v2"
except = ["/v2/public", "/v2/_catalog"]
mode = "all_of"

  [[rules.backends]]
  type = "gitlab"
  options = "url=https://git.example.com/,timeout=30s"

[[rules]]
path = "/"

  [[rules.backends]]
  type = "gitlab"
  options = "url=https://git.example.com/"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.gate.realm, "Registry");
        assert_eq!(config.gate.unmatched, UnmatchedPolicy::Deny);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].exceptions, vec!["/v2/public", "/v2/_catalog"]);
        assert_eq!(config.rules[0].mode, MatchMode::AllOf);
        assert_eq!(config.rules[0].backends[0].kind, "gitlab");
        assert_eq!(config.rules[1].mode, MatchMode::AnyOf);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.gate.forwarded_uri_header, "x-forwarded-uri");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_rule_without_backend_fails_validation() {
        let err = parse_config("[[rules]]\npath = \"/a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("at least one backend required"));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = parse_config("[[rules]]\npath = \"/a\"\nmode = \"some_of\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rules[0].path, "/v2");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
