//! Rule matching and backend dispatch.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, Authorization header)
//!     → rule.rs (prefix match minus exceptions)
//!     → dispatcher.rs (first matching rule, evaluate its backends)
//!     → Decision: NoMatch | Authenticated | Denied
//!
//! Rule compilation (at startup / reload):
//!     RuleConfig[]
//!     → construct backends through the registry
//!     → freeze as immutable RuleSet
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Plain prefix matching, no glob or regex
//! - Deterministic: first matching rule in configuration order wins
//! - No match is an explicit outcome; the host decides what it means

pub mod dispatcher;
pub mod rule;

pub use dispatcher::{Decision, RuleSet};
pub use rule::{MatchMode, Rule};
