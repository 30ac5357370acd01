// Account management. Listing and writes are manager operations; deletion
// is admin-only.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::Value;
use surrealdb::RecordId;

use crate::api::{AppState, authorize};
use crate::auth::{Requirement, Role};
use crate::db::{QueryBuilder, UserCreate, UserUpdate};
use crate::types::DepartmentSlug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", patch(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    first_name: String,
    last_name: String,
    email: String,
    /// Plaintext at the API boundary only; hashed before anything is stored.
    password: Option<String>,
    #[serde(default = "default_role")]
    role: Role,
    department: Option<DepartmentSlug>,
    avatar_url: Option<String>,
    bio: Option<String>,
}

fn default_role() -> Role {
    Role::Employee
}

/// Non-admin callers may only hand out roles strictly below their own;
/// admins may assign anything. Blocks a manager minting admins or promoting
/// peers to their own level.
fn may_assign_role(caller: Role, assigned: Role) -> bool {
    caller == Role::Admin || assigned < caller
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    let users = QueryBuilder::list_users(&state.db)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(serde_json::json!({
        "users": users,
        "count": users.len(),
    })))
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<Value>, StatusCode> {
    let claims = authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    if !may_assign_role(claims.role, payload.role) {
        return Err(StatusCode::FORBIDDEN);
    }

    // Hashing is CPU-bound; keep it off the async workers, same as login.
    let password_hash = match payload.password {
        Some(password) => {
            let hasher = state.auth.hasher().clone();
            let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
                .await
                .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
                .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
            Some(hash)
        }
        None => None,
    };

    let created = QueryBuilder::create_user(
        &state.db,
        &UserCreate {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
            role: payload.role,
            department: payload.department,
            avatar_url: payload.avatar_url,
            bio: payload.bio,
        },
    )
    .await
    // The realistic failure here is the unique email index.
    .map_err(|_e| StatusCode::CONFLICT)?;

    let value = serde_json::to_value(&created).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}

async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<Value>, StatusCode> {
    let claims = authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Manager))?;

    if let Some(role) = update.role
        && !may_assign_role(claims.role, role)
    {
        return Err(StatusCode::FORBIDDEN);
    }

    let user_id = RecordId::from_table_key("user", id);
    let updated = QueryBuilder::update_user(&state.db, &user_id, &update)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let value = serde_json::to_value(&updated).map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(value))
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers, &Requirement::RoleAtLeast(Role::Admin))?;

    let user_id = RecordId::from_table_key("user", id);
    let deleted = QueryBuilder::delete_user(&state.db, &user_id)
        .await
        .map_err(|_e| StatusCode::INTERNAL_SERVER_ERROR)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
