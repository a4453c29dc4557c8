//! rc-server: HTTP surface for reelcast.
//!
//! Ties the catalog (`rc-db`) and the streaming core (`rc-stream`) into an
//! axum application:
//!
//! - `GET /stream/{id}` serves single byte ranges of stored videos
//! - `/video` upload, listing, lookup, and deletion
//! - Graceful shutdown via signal handling or a cancellation token

pub mod context;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod storage;

use std::net::SocketAddr;

use rc_core::config::Config;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the reelcast server and run until a shutdown signal arrives.
pub async fn start(config: Config) -> rc_core::Result<()> {
    serve(config, CancellationToken::new()).await
}

/// Run the server until a shutdown signal arrives or `cancel` fires.
pub async fn serve(config: Config, cancel: CancellationToken) -> rc_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.server.db_path;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::create_dir_all(&config.storage.upload_dir)?;

    let db = rc_db::pool::init_pool(&db_path.to_string_lossy())?;
    let catalogued = rc_db::queries::videos::count_videos(&*rc_db::pool::get_conn(&db)?)?;
    tracing::info!(videos = catalogued, "Database ready at {:?}", db_path);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| rc_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, config);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| rc_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM, or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
