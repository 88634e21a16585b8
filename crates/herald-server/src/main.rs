use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use chrono_tz::Tz;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use herald_api::AppStateInner;
use herald_db::{Database, MemoryTables, TableStore};

const IN_MEMORY: &str = ":memory:";

struct Config {
    db_path: String,
    host: String,
    port: u16,
    tz: Tz,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("HERALD_DB_PATH").unwrap_or_else(|_| "herald.db".into());
        let host = std::env::var("HERALD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("HERALD_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;
        let tz_name = std::env::var("HERALD_TIMEZONE").unwrap_or_else(|_| "Asia/Bangkok".into());
        let tz: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HERALD_TIMEZONE '{}': {}", tz_name, e))?;

        Ok(Self { db_path, host, port, tz })
    }
}

fn open_store(db_path: &str) -> anyhow::Result<Arc<dyn TableStore>> {
    if db_path == IN_MEMORY {
        info!("Using in-memory tables; nothing will be persisted");
        return Ok(Arc::new(MemoryTables::new()));
    }
    Ok(Arc::new(Database::open(&PathBuf::from(db_path))?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_server=debug,herald_api=debug,herald_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store = open_store(&config.db_path)?;
    let state = AppStateInner::new(store, config.tz);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(herald_api::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Herald listening on {} (timezone {})", addr, config.tz);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            ctrl_c.await.ok();
            info!("Received Ctrl+C, shutting down...");
            return;
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
