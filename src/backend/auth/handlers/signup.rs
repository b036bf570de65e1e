/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate every field, collecting all failures
 * 2. Check that the username and email are free
 * 3. Hash password using bcrypt
 * 4. Create user in database
 * 5. Generate JWT token
 * 6. Return token and user info
 *
 * # Validation
 *
 * - Username: 3-30 chars, starts with a letter, letters/digits/underscore
 * - First and last name: required
 * - Email: `local@domain`
 * - Password: at least 8 characters
 * - Role: `developer` (default) or `manager`; admins are only made by admins
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username, NewUser};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::validation::{is_valid_email, is_valid_username, non_blank, JsonBody, Validator};
use crate::shared::Role;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign up handler
///
/// # Errors
///
/// * `422 Unprocessable Entity` - One or more fields are invalid
/// * `409 Conflict` - Username or email already registered
/// * `500 Internal Server Error` - Hashing, storage or token failure
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "username": "ada",
///   "firstName": "Ada",
///   "lastName": "Lovelace",
///   "email": "ada@example.com",
///   "password": "securepassword123",
///   "role": "manager"
/// }
/// ```
pub async fn signup(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let mut v = Validator::new();

    let username = v.required(
        "username",
        request.username.as_deref(),
        "Please provide a username.",
    );
    if let Some(name) = &username {
        v.check(
            is_valid_username(name),
            "username",
            "Username must be 3-30 characters, start with a letter, and contain only letters, numbers, and underscores.",
        );
    }
    let first_name = v.required(
        "firstName",
        request.first_name.as_deref(),
        "Please provide your first name.",
    );
    let last_name = v.required(
        "lastName",
        request.last_name.as_deref(),
        "Please provide your last name.",
    );
    let email = v.required("email", request.email.as_deref(), "Please provide a valid email.");
    if let Some(email) = &email {
        v.check(is_valid_email(email), "email", "Please provide a valid email.");
    }
    let password = request.password.unwrap_or_default();
    v.check(
        password.len() >= MIN_PASSWORD_LENGTH,
        "password",
        "Please enter a password with 8 or more characters.",
    );
    let role = match non_blank(request.role.as_deref()) {
        None => Some(Role::Developer),
        Some(raw) => match raw.parse::<Role>() {
            Ok(role @ (Role::Developer | Role::Manager)) => Some(role),
            _ => {
                v.push("role", "Role must be either developer or manager.");
                None
            }
        },
    };
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;

    let (Some(username), Some(first_name), Some(last_name), Some(email), Some(role)) =
        (username, first_name, last_name, email, role)
    else {
        return Err(BackendError::bad_request("Invalid signup request"));
    };

    tracing::info!("Signup request for username: {}, email: {}", username, email);

    if get_user_by_username(&app_state.db, &username).await?.is_some() {
        return Err(BackendError::conflict("Username already taken"));
    }
    if get_user_by_email(&app_state.db, &email).await?.is_some() {
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash(&password, app_state.bcrypt_cost())?;

    let user = create_user(
        &app_state.db,
        NewUser {
            username,
            first_name,
            last_name,
            email,
            password_hash,
            role,
        },
    )
    .await
    .map_err(BackendError::from)
    .map_err(|e| {
        // Lost a race with a concurrent signup
        if e.is_unique_violation() {
            BackendError::conflict("Username or email already registered")
        } else {
            e
        }
    })?;

    let token = app_state.sessions.create_token(&user)?;

    tracing::info!("User created successfully: {} ({})", user.username, user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
