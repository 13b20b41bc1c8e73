//! Middleware for embedding the gate in an axum application.

pub mod require_auth;

pub use require_auth::require_auth;
