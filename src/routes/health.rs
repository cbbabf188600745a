//! Health check endpoints for container orchestration.
//!
//! - `/liveness` answers as long as the process can serve HTTP at all.
//! - `/readiness` answers `ok` only when a fresh database connection can be opened
//!   within the connect timeout. It uses its own connection settings, where a missing
//!   or malformed `DB_*` variable falls back to its default, so configuration alone
//!   never makes the check fail.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    fn ok() -> (StatusCode, Json<Self>) {
        (StatusCode::OK, Json(Self { status: "ok" }))
    }

    fn fail() -> (StatusCode, Json<Self>) {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(Self { status: "fail" }))
    }
}

/// Liveness check. Always healthy.
pub async fn liveness() -> (StatusCode, Json<HealthResponse>) {
    HealthResponse::ok()
}

/// Readiness check. Healthy when the database accepts a connection.
#[instrument(name = "health::readiness", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => HealthResponse::ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Database connection failed");
            HealthResponse::fail()
        }
    }
}
