//! Per-request backend errors.

use std::time::Duration;

use thiserror::Error;

/// Error outcome of a single `authenticate` call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The verification target answered with a redirect.
    #[error("follow redirects disabled: upstream answered {status}")]
    RedirectRejected {
        status: u16,
        location: Option<String>,
    },

    /// The verification call did not complete in time.
    #[error("verification request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or TLS failure reaching the verification target.
    #[error("verification request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl BackendError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::RedirectRejected { .. } => "redirect",
            BackendError::Timeout(_) => "timeout",
            BackendError::Transport(_) => "transport",
        }
    }
}
