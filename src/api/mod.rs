use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::query_engine::QueryEngine;

pub mod handlers;
pub mod models;

pub fn create_router(query_engine: Arc<QueryEngine>, static_dir: impl AsRef<Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/api", get(handlers::search_handler))
        .with_state(query_engine)
        // Static file serving for the search page
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
}

/// Serves `router` on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    log::info!("Search API listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    log::info!("Search API on {addr} shut down");
    Ok(())
}
