//! Forward-auth HTTP server.
//!
//! # Responsibilities
//! - Answer sub-requests from a fronting proxy with `200` or `401`
//! - Wire up middleware (tracing, request ID, timeout)
//! - Swap in rebuilt rules when the configuration changes
//! - Serve over plain TCP or TLS until shutdown
//!
//! The fronting proxy forwards the client's `Authorization` header and the
//! original URI (see `gate.forwarded_uri_header`); every path on this server
//! is treated as an authentication check.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::backend::BackendRegistry;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::gate::{Gate, SharedGate, Verdict};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Standalone authentication gateway.
pub struct GatewayServer {
    router: Router,
    gate: SharedGate,
    registry: Arc<BackendRegistry>,
}

impl GatewayServer {
    /// Build every backend and rule. Any failure is fatal.
    pub fn new(config: GatewayConfig, registry: BackendRegistry) -> Result<Self, ConfigError> {
        let gate = Gate::from_config(&config, &registry)?.shared();
        let router = Self::build_router(&config, gate.clone());

        Ok(Self {
            router,
            gate,
            registry: Arc::new(registry),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, gate: SharedGate) -> Router {
        Router::new()
            .fallback(forward_auth)
            .with_state(gate)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Gate currently in force.
    pub fn gate(&self) -> SharedGate {
        self.gate.clone()
    }

    /// The router, for serving it some other way.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        spawn_reloader(self.gate.clone(), self.registry.clone(), config_updates);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Serve TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "Gateway listening (TLS)");

        spawn_reloader(self.gate.clone(), self.registry.clone(), config_updates);

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            wait_for_shutdown(shutdown).await;
            drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Rebuild the gate for every configuration update.
fn spawn_reloader(
    gate: SharedGate,
    registry: Arc<BackendRegistry>,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
) {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            match Gate::from_config(&config, &registry) {
                Ok(next) => {
                    let rules = next.rules().len();
                    gate.store(Arc::new(next));
                    tracing::info!(rules, "Rules reloaded");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rejected new configuration, keeping current rules");
                }
            }
        }
    });
}

/// Every request is an authentication check.
async fn forward_auth(State(gate): State<SharedGate>, request: Request<Body>) -> Response {
    let gate = gate.load_full();
    let (parts, _) = request.into_parts();
    let path = gate.forwarded_path(&parts);

    match gate.check(path, &parts).await {
        Verdict::Allow => StatusCode::OK.into_response(),
        Verdict::Challenge => gate.challenge_response(),
    }
}
