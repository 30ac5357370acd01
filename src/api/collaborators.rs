// Read-only collaborator directory.
//
// Open to any authenticated user; always serves the narrow projection so
// credential material and progress details stay internal.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{AppState, authorize};
use crate::auth::Requirement;
use crate::db::QueryBuilder;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/collaborators", get(list_collaborators))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    department: Option<String>,
    /// Case-insensitive substring match over names and email.
    q: Option<String>,
    limit: Option<usize>,
}

async fn list_collaborators(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::AnyAuthenticated)?;

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let collaborators = QueryBuilder::list_collaborators(
        &state.db,
        params.department.as_deref(),
        params.q.as_deref(),
        limit,
    )
    .await
    .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "collaborators": collaborators,
        "count": collaborators.len(),
    })))
}
