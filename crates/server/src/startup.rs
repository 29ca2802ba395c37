use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::{
    file::user_store::{StoreMode, StorePaths, UserStore},
    runtime,
};

use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Resolve the store mode and paths from configs, falling back to the stock
/// layout under `data/` when no config file is present.
fn load_storage() -> anyhow::Result<(StoreMode, StorePaths)> {
    let storage = match configs::load_default() {
        Ok(mut cfg) => {
            cfg.normalize_and_validate()?;
            cfg.storage
        }
        Err(_) => configs::StorageConfig::default(),
    };
    let mode: StoreMode = storage.mode.parse()?;
    let paths = StorePaths {
        ledger: storage.ledger_path.into(),
        shard_dir: storage.shard_dir.into(),
        secondary_ledger: storage.secondary_ledger_path.into(),
        secondary_shard_dir: storage.secondary_shard_dir.into(),
    };
    Ok((mode, paths))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    runtime::ensure_env("data").await?;

    let (mode, paths) = load_storage()?;
    let store = UserStore::new(mode, paths).await?;

    let cors = build_cors();
    let app: Router = routes::build_router(Arc::clone(&store), cors);

    let addr = load_bind_addr()?;
    info!(%addr, ?mode, "starting intake server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
