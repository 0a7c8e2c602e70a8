//! Cafe API Server
//!
//! REST API over the `CafeItems` collection, backed by an embedded SQLite
//! database.

mod config;
mod error;
mod extractors;
mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::{middleware::map_request, routing::get, Router};
use cafe_core::CafeItemStore;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use handlers::cafe_models;
use storage::Database;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CafeItemStore>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    // Log crashes through the subscriber
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        error!(%location, "Panic: {}", panic_message(info.payload()));
    }));

    info!("Starting Cafe API Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_string())
}

async fn run_server() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.database_path
    );

    let db = Database::new(&config.database_path, config.max_connections)
        .await
        .context("Failed to initialize database")?;

    let state = AppState {
        store: Arc::new(db),
    };
    let app = router(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    let resource = format!("{}/:id", cafe_models::RESOURCE_PATH);
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            cafe_models::RESOURCE_PATH,
            get(cafe_models::list).post(cafe_models::create),
        )
        .route(
            &resource,
            get(cafe_models::get)
                .put(cafe_models::update)
                .delete(cafe_models::delete),
        )
        .with_state(state);

    // Routing happens inside the fallback so the path is normalized first.
    let routes = map_request(cafe_models::normalize_path).layer(routes);
    Router::new()
        .fallback_service(routes)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
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
