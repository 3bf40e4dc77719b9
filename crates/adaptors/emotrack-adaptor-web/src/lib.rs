//! Emotrack HTTP API
//!
//! Devices post cumulative emotion batches to `POST /api/emotions/batch`;
//! dashboards read `GET /api/dashboard/summary?device_id=...`. `GET /` is a
//! health check.

#![warn(missing_docs)]

pub mod error;
pub mod routes;
pub mod schemas;

pub use error::ApiError;
pub use routes::{build_router, cors_layer, AppState};
pub use schemas::*;

use axum::Router;
use emotrack_core::Result;
use tokio::net::TcpListener;
use tracing::info;

/// Bind `addr` and serve `router` until Ctrl-C
pub async fn serve(addr: &str, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Emotrack API listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
