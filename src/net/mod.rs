//! Network listener support.
//!
//! Plain TCP listeners come straight from tokio; this module only adds the
//! rustls setup used when `listener.tls` is configured.

pub mod tls;
