// Announcement board (mural posts, highlights, new-hire welcomes).
//
// Reads are open to any authenticated user. Posting to a department's board
// is allowed for managers anywhere or members of that department; global
// posts are manager-only.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::Value;
use surrealdb::RecordId;

use crate::api::{AppState, authorize};
use crate::auth::{Requirement, Role};
use crate::db::{AnnouncementCreate, AnnouncementKind, AnnouncementUpdate, QueryBuilder};
use crate::types::DepartmentSlug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/announcements",
            get(list_announcements).post(create_announcement),
        )
        .route(
            "/api/announcements/{id}",
            patch(update_announcement).delete(delete_announcement),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    department: Option<String>,
}

async fn list_announcements(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::AnyAuthenticated)?;

    let announcements =
        QueryBuilder::list_announcements(&state.db, params.department.as_deref())
            .await
            .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "announcements": announcements,
        "count": announcements.len(),
    })))
}

#[derive(Debug, Deserialize)]
struct CreateAnnouncementRequest {
    title: String,
    body_html: Option<String>,
    #[serde(default = "default_kind")]
    kind: AnnouncementKind,
    department: Option<DepartmentSlug>,
    #[serde(default)]
    pinned: bool,
}

fn default_kind() -> AnnouncementKind {
    AnnouncementKind::General
}

async fn create_announcement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let requirement = match &payload.department {
        Some(dept) => Requirement::RoleAtLeast(Role::Manager)
            .or(Requirement::SameDepartment(dept.clone())),
        None => Requirement::RoleAtLeast(Role::Manager),
    };
    let claims = authorize(&state, &headers, &requirement)?;

    let author_id = claims.sub.parse::<RecordId>().ok();

    let created = QueryBuilder::create_announcement(
        &state.db,
        &AnnouncementCreate {
            title: payload.title,
            body_html: payload.body_html,
            kind: payload.kind,
            department: payload.department,
            pinned: payload.pinned,
            author_id,
        },
    )
    .await
    .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    let value = serde_json::to_value(&created).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// Edit an announcement or toggle its pin. Board management, so manager-up.
async fn update_announcement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<AnnouncementUpdate>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let announcement_id = RecordId::from_table_key("announcement", id);
    let updated = QueryBuilder::update_announcement(&state.db, &announcement_id, &update)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let value = serde_json::to_value(&updated).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}

async fn delete_announcement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let announcement_id = RecordId::from_table_key("announcement", id);
    let deleted = QueryBuilder::delete_announcement(&state.db, &announcement_id)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
