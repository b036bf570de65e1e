/**
 * User Administration Handlers
 *
 * `/api/users` routes. The router puts these behind both the auth middleware
 * and the admin gate, so the handlers themselves only deal with the request.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::{RoleUpdateRequest, UserResponse};
use crate::backend::auth::handlers::me::LAST_ADMIN_MESSAGE;
use crate::backend::auth::users::{self, RoleChange};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::validation::{JsonBody, Validator};
use crate::shared::Role;

/// GET /api/users
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<Json<Vec<UserResponse>>, BackendError> {
    let users = users::list_users(&pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /api/users/{user_id}/role
///
/// Body `{ "role": "developer" | "manager" | "admin" }`. The last admin
/// cannot be demoted.
pub async fn update_user_role(
    State(pool): State<SqlitePool>,
    AuthUser(admin): AuthUser,
    Path(user_id): Path<Uuid>,
    JsonBody(request): JsonBody<RoleUpdateRequest>,
) -> Result<Json<UserResponse>, BackendError> {
    let mut v = Validator::new();
    let role = v.parse::<Role>(
        "role",
        request.role.as_deref(),
        "Role must be one of developer, manager or admin.",
    );
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;
    let Some(role) = role else {
        return Err(BackendError::bad_request("Invalid role request"));
    };

    let user = match users::update_role(&pool, user_id, role).await? {
        RoleChange::Updated(user) => user,
        RoleChange::LastAdmin => {
            tracing::warn!("Role change refused for {}: last admin", user_id);
            return Err(BackendError::bad_request(LAST_ADMIN_MESSAGE));
        }
        RoleChange::Missing => return Err(BackendError::not_found("User not found")),
    };

    tracing::info!("Role of {} set to {} by {}", user.username, role, admin.username);
    Ok(Json(user.into()))
}
