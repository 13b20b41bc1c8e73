//! Backend type registry.
//!
//! # Responsibilities
//! - Map backend type names to constructors
//! - Reject duplicate registrations and unknown names
//! - Build backend instances from option strings
//!
//! # Design Decisions
//! - Plain value built once at startup and passed by reference
//! - Constructors are function pointers: no captured state

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backend::gitlab::{self, GitlabBackend};
use crate::backend::Backend;
use crate::config::ConfigError;

/// Builds a backend from its option string.
pub type BackendConstructor = fn(&str) -> Result<Arc<dyn Backend>, ConfigError>;

/// Registered backend types.
#[derive(Clone, Default)]
pub struct BackendRegistry {
    constructors: HashMap<String, BackendConstructor>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every backend shipped in this crate.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry
            .register(gitlab::BACKEND_NAME, GitlabBackend::constructor)
            .expect("builtin backend names are unique");
        registry
    }

    /// Register a constructor under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: BackendConstructor,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return Err(ConfigError::DuplicateBackend(name));
        }
        tracing::debug!(backend = %name, "Registered backend type");
        self.constructors.insert(name, constructor);
        Ok(())
    }

    /// Find the constructor registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<BackendConstructor, ConfigError> {
        self.constructors
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
    }

    /// Look up `name` and construct a backend from `options`.
    pub fn build(&self, name: &str, options: &str) -> Result<Arc<dyn Backend>, ConfigError> {
        let constructor = self.lookup(name)?;
        constructor(options)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use async_trait::async_trait;
    use axum::http::request::Parts;

    #[derive(Debug)]
    struct Nobody;

    #[async_trait]
    impl Backend for Nobody {
        fn name(&self) -> &str {
            "nobody"
        }

        async fn authenticate(&self, _request: &Parts) -> Result<bool, BackendError> {
            Ok(false)
        }
    }

    fn nobody(_options: &str) -> Result<Arc<dyn Backend>, ConfigError> {
        Ok(Arc::new(Nobody))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = BackendRegistry::new();
        registry.register("nobody", nobody).unwrap();

        let backend = registry.build("nobody", "").unwrap();
        assert_eq!(backend.name(), "nobody");
    }

    #[test]
    fn test_duplicate_registration_fails_second_time() {
        let mut registry = BackendRegistry::new();
        registry.register("nobody", nobody).unwrap();

        let err = registry.register("nobody", nobody).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateBackend(ref n) if n == "nobody"));
        assert_eq!(err.to_string(), "backend nobody is already registered");
    }

    #[test]
    fn test_unknown_name_is_descriptive() {
        let registry = BackendRegistry::new();
        let err = registry.lookup("ldap").err().unwrap();
        assert!(matches!(err, ConfigError::UnknownBackend(ref n) if n == "ldap"));
        assert_eq!(err.to_string(), "unknown backend ldap");
    }

    #[test]
    fn test_builtin_backends() {
        let registry = BackendRegistry::with_builtin_backends();
        assert_eq!(registry.names(), vec!["gitlab"]);

        let err = registry.build("gitlab", "timeout=1s").unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { ref key } if key == "url"));
    }
}
