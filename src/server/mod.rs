//! HTTP service.
//!
//! Exposes `POST /api/analyze`, `POST /api/download` and `GET /api/health`.

pub mod error;
pub mod routes;

pub use error::{status_for, ErrorBody};
pub use routes::{content_disposition, cors_layer, router, AppState};

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{Error, Result};

/// Run the HTTP service until Ctrl-C.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let app = router(state, &config.server.allowed_origins)?;

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|e| Error::Config(format!("Cannot listen on {}: {}", config.server.bind_addr, e)))?;

    tracing::info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
