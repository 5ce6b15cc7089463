//! Health check endpoint
//!
//! Reports whether the planning database answers, how many productions it
//! holds, and which build is serving.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the database does not answer
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub build: &'static str,
    pub productions: Option<i64>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let productions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM productions")
        .fetch_one(&state.db)
        .await;

    let (status, label, productions) = match productions {
        Ok(count) => (StatusCode::OK, "ok", Some(count)),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            module: "livecrew-api",
            version: env!("CARGO_PKG_VERSION"),
            build: env!("GIT_HASH"),
            productions,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
