//! Authentication Module
//!
//! User accounts, registration, login and JWT sessions.
//!
//! # Architecture
//!
//! - **`users`** - User record and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`handlers`** - HTTP handlers for `/api/auth` and `/api/users`
//!
//! # Authentication Flow
//!
//! 1. **Signup**: user details validated → password hashed → user created → token returned
//! 2. **Login**: email or username plus password verified → token returned
//! 3. **Protected requests**: `Authorization: Bearer <token>` checked by the
//!    auth middleware, which reloads the user so role changes apply at once
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt (cost from config)
//! - Tokens are HS256 JWTs with a configurable lifetime
//! - Unknown user and wrong password give the same 401 message

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest, UserResponse};
pub use handlers::{delete_me, get_me, list_users, login, signup, update_user_role};
pub use sessions::{Claims, SessionKeys};
