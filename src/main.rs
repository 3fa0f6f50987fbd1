use std::sync::Arc;

use clap::Parser;
use minilabs::config::{Cli, Config, StoreKind, default_config_dir, default_config_path};
use minilabs::db::Database;
use minilabs::handler::{AppState, router};
use minilabs::store::MemoryStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // If --config is provided, its parent directory holds the database.
    // Otherwise both live in ~/.minilabs/
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("minilabs.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let (state, db) = match cfg.app.store {
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, records are lost on shutdown");
            (AppState::new(Arc::new(MemoryStore::new())), None)
        }
        StoreKind::Libsql => {
            let db = Arc::new(Database::new(&cfg, &data_dir).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to setup database");
                std::process::exit(1);
            }));
            if let Err(e) = db.sync().await {
                tracing::warn!(error = %e, "initial sync failed");
            }
            (AppState::new(db.clone()), Some(db))
        }
    };

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("minilabs.svc running on {}", &address);
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
    };

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    if let Some(db) = db {
        if let Err(e) = db.sync().await {
            tracing::warn!(error = %e, "final sync failed");
        }
    }
    tracing::info!("minilabs.svc going off, graceful shutdown complete");
}
