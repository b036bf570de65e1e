//! Authentication Handlers Module
//!
//! HTTP handlers for account endpoints, one submodule per concern.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── me.rs       - Current user handlers
//! └── users.rs    - Admin user management
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup - User registration
//! - **`login`** - POST /api/auth/login - User authentication
//! - **`get_me`** - GET /api/auth/me - Current user info
//! - **`delete_me`** - DELETE /api/auth/me - Delete own account
//! - **`list_users`** - GET /api/users - All users (admin)
//! - **`update_user_role`** - PUT /api/users/{user_id}/role - Change role (admin)

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Current user handlers
pub mod me;

/// Admin user management handlers
pub mod users;

// Re-export commonly used types
pub use types::{AuthResponse, LoginRequest, MessageResponse, SignupRequest, UserResponse};

// Re-export handlers
pub use login::login;
pub use me::{delete_me, get_me};
pub use signup::signup;
pub use users::{list_users, update_user_role};
