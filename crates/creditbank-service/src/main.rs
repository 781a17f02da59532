//! creditbankd - credit quote service of a simulated bank
//!
//! Serves `GET /<version>/credit` and `GET /<version>/health`, reading bank bounds and
//! client groups from the configuration backend.

use clap::Parser;
use creditbank_service::{build_router, ServiceSettings, ServiceState};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "creditbankd", version, about = "Credit quote REST service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CREDITBANK_CONFIG")]
    config: Option<String>,

    /// Listen address, e.g. 127.0.0.1:8080
    #[arg(short, long, env = "CREDITBANK_LISTEN_ADDR")]
    listen: Option<SocketAddr>,

    /// Log level
    #[arg(long, env = "CREDITBANK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "CREDITBANK_LOG_JSON")]
    json: bool,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = ServiceSettings::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        settings.server.listen_addr = listen;
    }
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    settings.logging.json |= cli.json;

    init_tracing(&settings.logging.level, settings.logging.json);

    let state = ServiceState::bootstrap(&settings)?;
    let app = build_router(state, &settings.server.api_version);

    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        bank = %settings.bank.name,
        backend = %settings.config_backend.host,
        "creditbank-service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("creditbank-service stopped");
    Ok(())
}

/// Resolves on the first of SIGINT or SIGTERM; in-flight quotes are allowed to finish.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!(signal, "creditbank-service draining in-flight quotes before shutdown");
}
