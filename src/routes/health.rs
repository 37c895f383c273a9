use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::AppState;

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Reports whether the catalog store answers and uploads can be written.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.catalog.ping().await;
    let uploads = state.images.ensure_ready().await;

    let status = |check: &crate::error::Result<()>, ok: &'static str| match check {
        Ok(()) => ok,
        Err(e) => {
            e.log("readiness check");
            "unavailable"
        }
    };

    let (code, summary) = if catalog.is_ok() && uploads.is_ok() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(json!({
            "status": summary,
            "database": status(&catalog, "connected"),
            "uploads": status(&uploads, "writable"),
        })),
    )
}
