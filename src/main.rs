//! Authentication gateway (forward-auth service).
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                  REAUTH GATEWAY                      │
//!                    │                                                      │
//!  Proxy sub-request │  ┌────────┐    ┌────────┐    ┌────────────────────┐  │
//!  ──────────────────┼─▶│  http  │───▶│  gate  │───▶│ rules (first match,│  │
//!  Authorization,    │  │ server │    │        │    │ minus exceptions)  │  │
//!  X-Forwarded-Uri   │  └────────┘    └────────┘    └─────────┬──────────┘  │
//!                    │                                         │             │
//!                    │                                         ▼             │
//!   200 / 401        │                               ┌────────────────────┐  │   GET <url>/<path>.git
//!  ◀─────────────────┼───────────────────────────────│ backends (any_of / │──┼──▶ Upstream
//!                    │                               │ all_of)            │  │    (GitLab)
//!                    │                               └────────────────────┘  │
//!                    │  config (TOML, hot reload) · observability · lifecycle │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use reauth_gateway::backend::BackendRegistry;
use reauth_gateway::config::loader::load_config;
use reauth_gateway::config::watcher::ConfigWatcher;
use reauth_gateway::http::{Gate, GatewayServer};
use reauth_gateway::lifecycle::{signals, Shutdown};
use reauth_gateway::net::tls::load_tls_config;
use reauth_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "reauth-gateway")]
#[command(about = "Path-scoped HTTP authentication gateway", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, default_value = "reauth.toml")]
    config: PathBuf,

    /// Validate the configuration, build every backend, then exit.
    #[arg(long)]
    check: bool,

    /// Do not reload the configuration when the file changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability.log_level);

    tracing::info!(config = ?cli.config, "reauth-gateway v0.1.0 starting");

    let registry = BackendRegistry::with_builtin_backends();

    if cli.check {
        let gate = Gate::from_config(&config, &registry)?;
        println!("configuration OK: {} rule(s)", gate.rules().len());
        return Ok(());
    }

    let server = GatewayServer::new(config.clone(), registry)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules = config.rules.len(),
        unmatched = ?config.gate.unmatched,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let (watcher, config_updates) = ConfigWatcher::new(&cli.config);
    let _watcher = if cli.no_watch {
        None
    } else {
        match watcher.run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                None
            }
        }
    };

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            let tls = load_tls_config(tls).await?;
            server.run_tls(addr, tls, config_updates, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, config_updates, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
