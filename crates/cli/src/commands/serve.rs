//! `serve` command implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::ServiceBlueprint;
use telemetry_hub::{build_router, AppState};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

use crate::cli::ServeArgs;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;

    if let Some(port) = blueprint.observability.metrics_port {
        observability::install_prometheus(port)?;
    }

    let addr: SocketAddr = blueprint
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", blueprint.server.bind_addr))?;

    if blueprint.server.admin_secret.is_none() {
        warn!("No admin secret configured - publishing routes will answer 500");
    }

    let state = Arc::new(AppState::from_blueprint(&blueprint));
    let app = build_router(Arc::clone(&state)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        %addr,
        window_secs = blueprint.aggregation.deviation_window_secs,
        queue_capacity = blueprint.broadcast.subscriber_queue_capacity,
        "Telemetry Hub listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Telemetry Hub stopped");
    println!("{}", state.aggregator.ingest_summary());

    Ok(())
}

/// Load the configuration file (or defaults) and apply CLI overrides
fn load_blueprint(args: &ServeArgs) -> Result<ServiceBlueprint> {
    let mut blueprint = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            ServiceBlueprint::default()
        }
    };

    if let Some(bind) = args.bind {
        info!(bind = %bind, "Overriding bind address from CLI");
        blueprint.server.bind_addr = bind.to_string();
    }
    if let Some(ref secret) = args.admin_secret {
        info!("Overriding admin secret from CLI/environment");
        blueprint.server.admin_secret = Some(secret.clone());
    }
    if let Some(port) = args.metrics_port {
        blueprint.observability.metrics_port = Some(port);
    }

    ConfigLoader::validate(&blueprint).context("Configuration invalid after overrides")?;
    Ok(blueprint)
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, draining connections...");
}
