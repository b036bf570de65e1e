/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts and verifies JWT tokens from the
 * Authorization header and provides the caller to handlers.
 *
 * The user is reloaded from the database on every request, so handlers
 * see the current role and display name, and tokens of deleted accounts
 * stop working immediately.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::{Project, Role};

/// Message for a missing, malformed or expired token
pub const INVALID_TOKEN_MESSAGE: &str = "No valid token, authorization denied";

/// Authenticated user attached to the request by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    /// Display name, stamped on comments
    pub name: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Project manager or admin
    pub fn can_manage(&self, project: &Project) -> bool {
        self.is_admin() || project.is_manager(self.user_id)
    }

    /// Project member (manager or listed developer) or admin
    pub fn can_contribute(&self, project: &Project) -> bool {
        self.is_admin() || project.is_member(self.user_id)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts JWT token from Authorization header
/// 2. Verifies the token
/// 3. Loads the user named by the token's `sub` claim
/// 4. Attaches user data to request extensions for use in handlers
///
/// Returns 401 Unauthorized if the token is missing or invalid, or the user
/// no longer exists.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = bearer_token(header).ok_or_else(|| {
        tracing::warn!("Missing or malformed Authorization header");
        BackendError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    let claims = app_state.sessions.verify_token(token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    let user = get_user_by_id(&app_state.db, user_id).await?.ok_or_else(|| {
        tracing::warn!("Token for unknown user {}", user_id);
        BackendError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        name: user.display_name(),
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Role gate for admin-only routes
///
/// Must run inside [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, BackendError> {
    let is_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(AuthenticatedUser::is_admin);

    if !is_admin {
        return Err(BackendError::not_permitted());
    }
    Ok(next.run(request).await)
}

/// Axum extractor for authenticated user
///
/// This can be used as a parameter in handlers to automatically extract
/// the authenticated user from request extensions.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized(INVALID_TOKEN_MESSAGE)
            })?;

        Ok(AuthUser(user))
    }
}
