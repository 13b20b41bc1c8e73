//! Host-facing HTTP surface.
//!
//! # Data Flow
//! ```text
//! Embedded (middleware/require_auth.rs):
//!     app request → gate → forward to app handler | 401 challenge
//!
//! Standalone (server.rs):
//!     proxy sub-request (Authorization, X-Forwarded-Uri)
//!     → gate → 200 | 401 challenge
//! ```

pub mod gate;
pub mod middleware;
pub mod server;

pub use gate::{Gate, SharedGate, Verdict};
pub use middleware::require_auth;
pub use server::GatewayServer;
