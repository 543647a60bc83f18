//! User management endpoints (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{User, UserQuery},
};

use super::AuthenticatedUser;

/// Paginated user listing
#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub total: i64,
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<UserListResponse>> {
    claims.require_admin()?;

    let (users, total) = state.services.auth.list_users(&query).await?;
    Ok(Json(UserListResponse { users, total }))
}

/// Get a user by ID (admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.auth.get_user(id).await?;
    Ok(Json(user))
}
