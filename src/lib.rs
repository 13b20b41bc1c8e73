//! Path-scoped HTTP authentication gateway.
//!
//! Requests are matched against ordered path-prefix rules (with exception
//! prefixes); the matching rule's backends decide whether the presented
//! Basic-Auth credentials are accepted.

pub mod backend;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod rules;

pub use backend::{Backend, BackendError, BackendRegistry};
pub use config::schema::GatewayConfig;
pub use http::{Gate, GatewayServer};
pub use lifecycle::Shutdown;
pub use rules::{Decision, RuleSet};
