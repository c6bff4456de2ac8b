use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marvel_toyverse::config::{AppConfig, StorageBackend};
use marvel_toyverse::database::{manager, DocumentStore, MemoryDocumentStore, PgDocumentStore};
use marvel_toyverse::{app, AppState};

#[derive(Debug, Parser)]
#[command(name = "marvel-toyverse", version, about = "Marvel Toyverse API server")]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Document store: postgres or memory (overrides TOYVERSE_STORAGE)
    #[arg(long)]
    storage: Option<StorageBackend>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(storage) = self.storage {
            config.database.backend = storage;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ACCESS_TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    args.apply(&mut config);

    init_tracing(&config);
    info!("Starting Marvel Toyverse in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = manager::connect(&config)
                .await
                .context("failed to connect to database")?;
            manager::ensure_collections(&pool)
                .await
                .context("failed to prepare collections")?;
            Arc::new(PgDocumentStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory document store; data is lost on exit");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::with_jwt(config, store).context("token service misconfigured; set ACCESS_TOKEN_SECRET")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Marvel Toyverse listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Marvel Toyverse stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let default_filter = if config.api.enable_request_logging {
        "marvel_toyverse=info,tower_http=debug"
    } else {
        "marvel_toyverse=info,tower_http=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
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
                warn!("failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
