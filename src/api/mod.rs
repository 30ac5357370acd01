// REST API for the intranet backend.
//
// Every protected handler goes through `authorize`: resolve the bearer
// token to claims, evaluate a declarative requirement, and only then touch
// the database. No handler inspects the Authorization header itself.

pub mod announcements;
pub mod auth;
pub mod collaborators;
pub mod courses;
pub mod departments;
pub mod users;

use axum::{
    Router,
    http::{HeaderMap, StatusCode, header},
    response::Json,
    routing::get,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::{
    AuthError, Decision, Requirement, SessionAuthenticator, SessionClaims,
};
use crate::db::{Db, UserStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub auth: Arc<SessionAuthenticator<UserStore>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth::router())
        .merge(users::router())
        .merge(departments::router())
        .merge(announcements::router())
        .merge(courses::router())
        .merge(collaborators::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// Resolve the request's bearer token to verified claims.
///
/// This is the only path from a header to an identity. Missing, malformed,
/// tampered and expired tokens all map to 401; nothing downstream ever sees
/// partially trusted claims.
pub(crate) fn bearer_claims(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionClaims, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    state.auth.authenticate(token).map_err(|e| match e {
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    })
}

/// Authorize a request against a requirement, yielding the caller's claims.
///
/// 401 when no trusted claims are present, 403 when claims are present but
/// the requirement denies.
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    requirement: &Requirement,
) -> Result<SessionClaims, StatusCode> {
    let claims = bearer_claims(state, headers)?;

    match requirement.check(Some(&claims)) {
        Decision::Allowed => Ok(claims),
        Decision::Denied(reason) => {
            debug!(subject = %claims.sub, %reason, "request denied");
            Err(StatusCode::FORBIDDEN)
        }
    }
}
