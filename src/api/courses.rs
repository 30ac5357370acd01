// Course catalog and per-user completion tracking.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::Value;
use surrealdb::RecordId;

use crate::api::{AppState, authorize};
use crate::auth::{Requirement, Role};
use crate::db::{CourseCreate, CourseUpdate, QueryBuilder};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/{slug}", patch(update_course).delete(delete_course))
        .route("/api/courses/{slug}/toggle", post(toggle_completion))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    department: Option<String>,
}

async fn list_courses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::AnyAuthenticated)?;

    let courses = QueryBuilder::list_courses(&state.db, params.department.as_deref())
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "courses": courses,
        "count": courses.len(),
    })))
}

async fn create_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let created = QueryBuilder::create_course(&state.db, &payload)
        .await
        // The realistic failure here is the unique slug index.
        .map_err(|_e| StatusCode::CONFLICT)?;

    let value = serde_json::to_value(&created).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(value)))
}

async fn update_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(update): Json<CourseUpdate>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let course = QueryBuilder::find_course_by_slug(&state.db, &slug)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let updated = QueryBuilder::update_course(&state.db, &course.id, &update)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let value = serde_json::to_value(&updated).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}

async fn delete_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let course = QueryBuilder::find_course_by_slug(&state.db, &slug)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    QueryBuilder::delete_course(&state.db, &course.id)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the caller's own completion state for a course, awarding or
/// revoking its points.
async fn toggle_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let claims = authorize(&state, &headers, &Requirement::AnyAuthenticated)?;

    let course = QueryBuilder::find_course_by_slug(&state.db, &slug)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let user_id = claims
        .sub
        .parse::<RecordId>()
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    let updated = QueryBuilder::toggle_course_progress(&state.db, &user_id, &course)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(serde_json::json!({
        "points": updated.points,
        "course_progress": updated.course_progress,
    })))
}
