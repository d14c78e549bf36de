use axum::routing::get;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;
mod health;
mod share;

pub use config::Config;

use crate::AppState;

const API_PREFIX: &str = "/api";
const STATUS_PREFIX: &str = "/_status";

/// Build the full application router. The share route sits outside the API
/// prefix and carries no credential gate; everything under `/api` that
/// touches content is owner-scoped.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .route("/share/:hash", get(share::handler))
        .fallback(handlers::not_found_handler)
        .with_state(state)
}

pub async fn run(
    config: Config,
    state: AppState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let app_router = router(state).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, app_router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

/// Translate a storage-layer error into a response per the error taxonomy.
/// Unexpected faults are logged with context and surfaced as a generic
/// server fault; domain errors keep their stable message.
pub(crate) fn store_error_response(err: crate::database::StoreError, context: &str) -> axum::response::Response {
    use axum::response::IntoResponse;

    let status = err.status();
    if status == http::StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{context}: {err:?}");
        return (
            status,
            axum::Json(serde_json::json!({ "error": "unexpected error" })),
        )
            .into_response();
    }
    (
        status,
        axum::Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
