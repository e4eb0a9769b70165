use axum::{
    extract::{Path, State},
    Extension, Json,
};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{PutSettingRequest, SettingResponse};
use crate::error::{AppError, AppResult};
use crate::AppState;

const MAX_KEY_LEN: usize = 64;

/// Keys are short identifiers such as `theme` or `calendar.week_start`.
fn validate_key(key: &str) -> AppResult<()> {
    let well_formed = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if !well_formed {
        return Err(AppError::Validation(format!(
            "Setting key must be 1-{} characters of [A-Za-z0-9_.-]",
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

pub async fn get_setting(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(key): Path<String>,
) -> AppResult<Json<SettingResponse>> {
    validate_key(&key)?;

    let setting = state.store.get_setting(auth_user.id, &key).await?;

    Ok(Json(match setting {
        Some(s) => SettingResponse {
            key: s.key,
            value: Some(s.value),
            updated_at: Some(s.updated_at),
        },
        None => SettingResponse {
            key,
            value: None,
            updated_at: None,
        },
    }))
}

pub async fn put_setting(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<PutSettingRequest>,
) -> AppResult<Json<SettingResponse>> {
    validate_key(&key)?;
    req.validate()?;

    let setting = state
        .store
        .put_setting(auth_user.id, &key, &req.value)
        .await?;

    tracing::debug!(user_id = %auth_user.id, key = %setting.key, "Setting updated");

    Ok(Json(SettingResponse {
        key: setting.key,
        value: Some(setting.value),
        updated_at: Some(setting.updated_at),
    }))
}
