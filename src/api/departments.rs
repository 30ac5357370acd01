// Department hierarchy. Reads for any authenticated user, writes admin-only.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch},
};
use serde_json::Value;

use crate::api::{AppState, authorize};
use crate::auth::{Requirement, Role};
use crate::db::{DepartmentCreate, DepartmentUpdate, QueryBuilder};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/departments", get(list_departments).post(create_department))
        .route(
            "/api/departments/{slug}",
            patch(update_department).delete(delete_department),
        )
}

async fn list_departments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::AnyAuthenticated)?;

    let departments = QueryBuilder::list_departments(&state.db)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "departments": departments,
        "count": departments.len(),
    })))
}

async fn create_department(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DepartmentCreate>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Admin))?;

    let created = QueryBuilder::create_department(&state.db, &payload)
        .await
        // The realistic failure here is the unique slug index.
        .map_err(|_e| StatusCode::CONFLICT)?;

    let value = serde_json::to_value(&created).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(value)))
}

async fn update_department(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(update): Json<DepartmentUpdate>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Admin))?;

    let department = QueryBuilder::find_department_by_slug(&state.db, &slug)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let updated = QueryBuilder::update_department(&state.db, &department.id, &update)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let value = serde_json::to_value(&updated).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}

async fn delete_department(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Admin))?;

    let department = QueryBuilder::find_department_by_slug(&state.db, &slug)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    QueryBuilder::delete_department(&state.db, &department.id)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(StatusCode::NO_CONTENT)
}
