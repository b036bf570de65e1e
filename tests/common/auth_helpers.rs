//! Authentication test helpers
//!
//! Sign users up and log them in through the API, keeping their tokens.

use axum_test::TestServer;
use serde_json::{json, Value};

use super::app::{ADMIN_EMAIL, ADMIN_PASSWORD};

pub const TEST_PASSWORD: &str = "password123";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

impl TestUser {
    fn from_auth_response(body: &Value) -> Self {
        Self {
            id: body["user"]["id"].as_str().expect("user id").to_string(),
            username: body["user"]["username"].as_str().expect("username").to_string(),
            token: body["token"].as_str().expect("token").to_string(),
        }
    }
}

/// Signup request body for `username` with the given role
pub fn signup_body(username: &str, role: &str) -> Value {
    json!({
        "username": username,
        "firstName": "Test",
        "lastName": username,
        "email": format!("{username}@example.com"),
        "password": TEST_PASSWORD,
        "role": role,
    })
}

/// Register a user and return their credentials
pub async fn signup(server: &TestServer, username: &str, role: &str) -> TestUser {
    let response = server.post("/api/auth/signup").json(&signup_body(username, role)).await;
    response.assert_status_ok();
    TestUser::from_auth_response(&response.json())
}

pub async fn signup_manager(server: &TestServer, username: &str) -> TestUser {
    signup(server, username, "manager").await
}

pub async fn signup_developer(server: &TestServer, username: &str) -> TestUser {
    signup(server, username, "developer").await
}

/// Log in as the seeded admin
pub async fn login_admin(server: &TestServer) -> TestUser {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();
    TestUser::from_auth_response(&response.json())
}
