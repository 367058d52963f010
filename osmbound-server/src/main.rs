use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osmbound_server::{build_app, config::ServerConfig};

/// Serves OpenStreetMap neighborhood and ZIP code boundaries as GeoJSON
#[derive(Parser, Debug)]
#[command(name = "osmbound-server", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Overpass interpreter endpoint, overrides the config file
    #[arg(long)]
    overpass_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "osmbound_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(url) = cli.overpass_url {
        config.overpass.endpoint = url;
    }

    let app = build_app(&config)?;
    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    tracing::info!(
        listen = %config.listen,
        overpass = %config.overpass.endpoint,
        "Boundary service started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Boundary service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
