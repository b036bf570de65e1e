/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email, or by username when the identifier has no `@`
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 * 4. Return token and user info
 *
 * Unknown users and wrong passwords get the same 401 response.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::users::{get_user_by_email, get_user_by_username, User};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::validation::{non_blank, JsonBody, Validator};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid Credentials";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - Identifier or password missing
/// * `401 Unauthorized` - Unknown user or wrong password
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "securepassword123"
/// }
/// ```
pub async fn login(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let identifier = non_blank(request.email.as_deref())
        .or_else(|| non_blank(request.username.as_deref()))
        .map(str::to_string);

    let mut v = Validator::new();
    v.check(identifier.is_some(), "email", "Please include a valid email or username.");
    v.check(
        non_blank(request.password.as_deref()).is_some(),
        "password",
        "Password is required.",
    );
    v.finish(StatusCode::BAD_REQUEST)?;

    let identifier = identifier.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    tracing::info!("Login attempt for: {}", identifier);

    let user = find_user(&app_state, &identifier).await?.ok_or_else(|| {
        tracing::warn!("Login failed, no such user: {}", identifier);
        BackendError::unauthorized(INVALID_CREDENTIALS_MESSAGE)
    })?;

    if !verify(&password, &user.password_hash)? {
        tracing::warn!("Login failed, wrong password for: {}", user.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS_MESSAGE));
    }

    let token = app_state.sessions.create_token(&user)?;

    tracing::info!("User logged in successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

async fn find_user(app_state: &AppState, identifier: &str) -> Result<Option<User>, BackendError> {
    let user = if identifier.contains('@') {
        get_user_by_email(&app_state.db, identifier).await?
    } else {
        get_user_by_username(&app_state.db, identifier).await?
    };
    Ok(user)
}
