//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → rules::RuleSet::from_config (backends constructed via the registry)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server rebuilds the rule set and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Backend option strings stay opaque here; their constructors parse them

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use error::ConfigError;
pub use schema::{
    BackendEntry, GateConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RuleConfig,
    TimeoutConfig, TlsConfig, UnmatchedPolicy,
};
pub use validation::ValidationError;
