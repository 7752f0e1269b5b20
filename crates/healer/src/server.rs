//! Webhook server.
//!
//! Endpoints:
//! - `POST /api/alarms`: run one remediation for the posted alarm event
//! - `GET /health`: liveness
//!
//! Each remediation runs on its own task and completes even if the caller
//! disconnects.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::event::AlarmEvent;
use crate::handler::Healer;
use crate::result::RunResult;
use crate::types::{OutcomeKind, RemediationOutcome};

/// Build the HTTP router.
pub fn build_router(healer: Arc<Healer>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/alarms", post(alarm_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(healer)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn run_server(healer: Arc<Healer>, addr: &str) -> Result<()> {
    let app = build_router(healer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Healer webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Healer webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn alarm_handler(
    State(healer): State<Arc<Healer>>,
    Json(event): Json<AlarmEvent>,
) -> impl IntoResponse {
    let task = tokio::spawn(async move { healer.handle(&event).await });
    let result = task.await.unwrap_or_else(|e| {
        error!(error = %e, "Remediation task failed");
        RunResult::from(&RemediationOutcome::new(
            OutcomeKind::UnexpectedError,
            e.to_string(),
        ))
    });
    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result))
}
