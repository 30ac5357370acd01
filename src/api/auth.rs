// Session endpoints: login, refresh, current identity.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{AppState, bearer_claims};
use crate::auth::AuthError;
use crate::db::QueryBuilder;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

fn login_failure_status(err: AuthError) -> StatusCode {
    match err {
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        // Everything else is a credential/token problem; one uniform status.
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, StatusCode> {
    let issued = state
        .auth
        .login(&payload.email, &payload.password)
        .await
        .map_err(login_failure_status)?;

    Ok(Json(serde_json::json!({
        "token": issued.token,
        "token_type": "bearer",
        "expires_in": issued.claims.seconds_remaining(),
        "role": issued.claims.role,
        "department": issued.claims.dept,
    })))
}

/// Re-issue a token before it expires. Consults the store, so a disabled or
/// deleted account cannot extend its session.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let issued = state
        .auth
        .refresh(token)
        .await
        .map_err(login_failure_status)?;

    Ok(Json(serde_json::json!({
        "token": issued.token,
        "token_type": "bearer",
        "expires_in": issued.claims.seconds_remaining(),
        "role": issued.claims.role,
        "department": issued.claims.dept,
    })))
}

/// The caller's own profile, resolved from the token subject.
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let claims = bearer_claims(&state, &headers)?;

    let user = QueryBuilder::find_user_by_subject(&state.db, &claims.sub)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        // A valid token for a since-deleted account.
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let value = serde_json::to_value(&user).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}
