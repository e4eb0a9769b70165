use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::dto::{SnapshotRequest, SnapshotResponse};
use crate::services::snapshot::run_snapshot;
use crate::AppState;

/// On-demand run of the monthly snapshot. An absent body means `overwrite: true`.
///
/// Failures are reported as `500 { "error": ... }` rather than the usual
/// error envelope, matching the scheduled function's contract.
pub async fn run_monthly_snapshot(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Option<Json<SnapshotRequest>>,
) -> (StatusCode, Json<SnapshotResponse>) {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    tracing::info!(user_id = %auth_user.id, overwrite = req.overwrite, "Manual snapshot requested");

    match run_snapshot(
        state.store.as_ref(),
        Utc::now(),
        state.config.reference_timezone,
        req.overwrite,
    )
    .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome.into())),
        Err(e) => {
            tracing::error!(error = %e, "Monthly snapshot failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SnapshotResponse::failed(e.to_string())),
            )
        }
    }
}

/// CORS headers are attached by the function router's response layers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
