use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::services::dashboard::{self, DashboardStats};
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<DashboardStats>> {
    let stats = dashboard::dashboard(state.store.as_ref(), auth_user.id, state.today()).await?;
    Ok(Json(stats))
}
