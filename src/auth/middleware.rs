use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::{AppError, FunctionError};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

fn authenticate(state: &AppState, req: &Request) -> Result<AuthUser, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    Ok(AuthUser {
        id: token_data.claims.sub,
    })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Preflight probes carry no credentials
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_user = authenticate(&state, &req)?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

/// `require_auth` for the function endpoints; rejects with `{ "error": "..." }`.
pub async fn require_function_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, FunctionError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_user = authenticate(&state, &req)?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}
