//! Liveness and readiness check at `/health`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use beatmarket_core::ranking::ContentKind;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when PostgreSQL is unreachable. Rankings still
    /// answer in the degraded state, with empty pages.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Content kinds the ranking endpoints serve.
    pub content_kinds: Vec<&'static str>,
    /// Rows fetched per ranking candidate query.
    pub candidate_pool_limit: i64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = beatmarket_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: database unreachable, rankings will be empty");
    }

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        content_kinds: ContentKind::ALL.iter().map(|kind| kind.as_str()).collect(),
        candidate_pool_limit: state.engine.policies().track.candidate_pool_limit,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
