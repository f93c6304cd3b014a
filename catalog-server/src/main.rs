use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use catalog_core::{CatalogSearch, database::PostgresCatalogStore};
use catalog_server::{
    AppState, create_app,
    infra::config::{ConfigLoad, ConfigLoader},
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "Catalog search over HTTP")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "CATALOG_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "loaded config file");
    }
    for warning in &warnings {
        warn!(message = %warning, "configuration warning");
    }

    let store =
        PostgresCatalogStore::connect(&config.database.url, config.database.pool)
            .await
            .context("failed to connect to PostgreSQL")?
            .with_query_timeout(config.database.query_timeout);
    let search = CatalogSearch::new(Arc::new(store), config.tables.clone());

    let app = create_app(AppState::new(search));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    info!(%addr, "catalog server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
