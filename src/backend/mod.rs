//! Credential verification backends.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     rule config (type name + option string)
//!     → registry.rs (look up constructor by type name)
//!     → options.rs (parse key=value pairs)
//!     → concrete backend (immutable, shared via Arc)
//!
//! Per request:
//!     request parts
//!     → credentials.rs (extract Basic-Auth pair)
//!     → backend-specific verification (e.g. gitlab.rs)
//!     → Ok(true) | Ok(false) | Err(BackendError)
//! ```
//!
//! # Design Decisions
//! - Closed set of backend types, selected by name at configuration time
//! - Registry is an explicit value built at startup, not global state
//! - Backends hold no per-request state and are safe to share across tasks
//! - A backend error is an outcome of its own, distinct from a clean denial

use async_trait::async_trait;
use axum::http::request::Parts;

pub mod credentials;
pub mod error;
pub mod gitlab;
pub mod options;
pub mod registry;

pub use credentials::{basic_auth, BasicCredentials};
pub use error::BackendError;
pub use gitlab::GitlabBackend;
pub use options::BackendOptions;
pub use registry::{BackendConstructor, BackendRegistry};

/// A pluggable credential verifier.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Registered type name, used for logs and metrics.
    fn name(&self) -> &str;

    /// Decide whether the request carries acceptable credentials.
    ///
    /// `Ok(false)` is a clean denial. `Err(_)` means the backend could not
    /// reach a verdict; callers must treat it as not authenticated.
    async fn authenticate(&self, request: &Parts) -> Result<bool, BackendError>;
}
