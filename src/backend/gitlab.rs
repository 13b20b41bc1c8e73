//! Delegated verification against a GitLab instance.
//!
//! Lets CI jobs authenticate with the project path as username and the job
//! token as password, without storing either anywhere:
//!
//! ```text
//! docker login registry.example.com -u "$CI_PROJECT_PATH" -p "$CI_JOB_TOKEN"
//! ```
//!
//! The token is replayed against `<url>/<project path>.git` with a fixed
//! technical username. If GitLab answers `200` the token is valid for that
//! project and the request is authenticated.
//!
//! # Options
//! - `url` (required): base URL project paths are resolved against
//! - `username` (default `gitlab-ci-token`): username sent upstream
//! - `timeout` (default `1m`): bound on the whole verification call
//! - `insecure` (default `false`): skip certificate checks for https targets

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header::LOCATION, request::Parts};
use reqwest::{redirect, Client, StatusCode};
use url::Url;

use crate::backend::credentials::basic_auth;
use crate::backend::options::BackendOptions;
use crate::backend::{Backend, BackendError};
use crate::config::ConfigError;

/// Registered type name.
pub const BACKEND_NAME: &str = "gitlab";

/// Default bound on a verification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default technical username sent upstream.
pub const DEFAULT_USERNAME: &str = "gitlab-ci-token";

const REPOSITORY_SUFFIX: &str = ".git";

/// Backend that re-authenticates Basic-Auth credentials against GitLab.
#[derive(Debug)]
pub struct GitlabBackend {
    base_url: Url,
    username: String,
    timeout: Duration,
    insecure_skip_verify: bool,
    client: Client,
    /// Only present when `insecure` is set.
    insecure_client: Option<Client>,
}

impl GitlabBackend {
    /// Build from a raw option string.
    pub fn from_options(raw: &str) -> Result<Self, ConfigError> {
        let options = BackendOptions::parse(raw)?;

        let url = options.required("url")?;
        let base_url = Url::parse(url).map_err(|e| ConfigError::InvalidOption {
            key: "url".to_string(),
            value: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidOption {
                key: "url".to_string(),
                value: url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        let username = options.get("username").unwrap_or(DEFAULT_USERNAME).to_string();
        let timeout = options.duration("timeout")?.unwrap_or(DEFAULT_TIMEOUT);
        let insecure_skip_verify = options.boolean("insecure")?.unwrap_or(false);

        let client = build_client(timeout, false)?;
        let insecure_client = if insecure_skip_verify {
            Some(build_client(timeout, true)?)
        } else {
            None
        };

        tracing::info!(
            backend = BACKEND_NAME,
            url = %without_userinfo(&base_url),
            username = %username,
            timeout = ?timeout,
            insecure = insecure_skip_verify,
            "Backend configured"
        );

        Ok(Self {
            base_url,
            username,
            timeout,
            insecure_skip_verify,
            client,
            insecure_client,
        })
    }

    /// Registry entry point.
    pub fn constructor(raw: &str) -> Result<Arc<dyn Backend>, ConfigError> {
        Ok(Arc::new(Self::from_options(raw)?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn insecure_skip_verify(&self) -> bool {
        self.insecure_skip_verify
    }

    /// URL the credentials of `subject` are verified against.
    ///
    /// `None` if the subject cannot be resolved against the base URL or
    /// resolves to a different origin (scheme, host and port).
    pub fn verification_target(&self, subject: &str) -> Option<Url> {
        let subject = normalize_subject(subject);
        let target = self.base_url.join(&subject).ok()?;
        if target.origin() != self.base_url.origin() {
            tracing::warn!(
                backend = BACKEND_NAME,
                subject = %subject,
                "Subject resolves outside the configured origin"
            );
            return None;
        }
        Some(target)
    }

    fn skips_verification(&self, target: &Url) -> bool {
        self.insecure_skip_verify && target.scheme() == "https"
    }

    fn client_for(&self, target: &Url) -> &Client {
        match &self.insecure_client {
            Some(insecure) if self.skips_verification(target) => insecure,
            _ => &self.client,
        }
    }
}

#[async_trait]
impl Backend for GitlabBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn authenticate(&self, request: &Parts) -> Result<bool, BackendError> {
        let Some(credentials) = basic_auth(&request.headers) else {
            return Ok(false);
        };

        let Some(target) = self.verification_target(&credentials.username) else {
            return Ok(false);
        };

        let response = self
            .client_for(&target)
            .get(target.clone())
            .basic_auth(&self.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout)
                } else {
                    BackendError::Transport(e)
                }
            })?;

        let status = response.status();
        tracing::debug!(backend = BACKEND_NAME, target = %target, status = %status, "Verification response");

        if is_followable_redirect(status) {
            if let Some(location) = response.headers().get(LOCATION) {
                return Err(BackendError::RedirectRejected {
                    status: status.as_u16(),
                    location: location.to_str().ok().map(str::to_string),
                });
            }
        }

        Ok(status == StatusCode::OK)
    }
}

/// Append `.git` unless the subject already ends with it.
pub fn normalize_subject(subject: &str) -> Cow<'_, str> {
    if subject.ends_with(REPOSITORY_SUFFIX) {
        Cow::Borrowed(subject)
    } else {
        Cow::Owned(format!("{subject}{REPOSITORY_SUFFIX}"))
    }
}

/// Statuses an HTTP client would follow given a `Location` header.
/// 300 and 304 are plain answers.
fn is_followable_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Copy of `url` safe to log.
fn without_userinfo(url: &Url) -> Url {
    let mut url = url.clone();
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url
}

fn build_client(timeout: Duration, accept_invalid_certs: bool) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::none())
        .no_proxy()
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(ConfigError::HttpClient)
}
