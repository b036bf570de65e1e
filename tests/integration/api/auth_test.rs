//! Authentication API integration tests
//!
//! Signup, login, the current-user routes and the admin user routes.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

#[tokio::test]
async fn test_signup_success() {
    let app = TestApp::new().await;

    let response = app.server.post("/api/auth/signup").json(&signup_body("ada", "manager")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "ada");
    assert_eq!(body["user"]["role"], "manager");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_defaults_to_developer() {
    let app = TestApp::new().await;
    let mut body = signup_body("grace", "developer");
    body.as_object_mut().unwrap().remove("role");

    let response = app.server.post("/api/auth/signup").json(&body).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["role"], "developer");
}

#[tokio::test]
async fn test_signup_reports_every_invalid_field() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/auth/signup")
        .json(&json!({
            "username": "1bad",
            "email": "not-an-email",
            "password": "short",
            "role": "admin",
        }))
        .await;

    crate::assert_field_errors!(
        response,
        StatusCode::UNPROCESSABLE_ENTITY,
        ["username", "firstName", "lastName", "email", "password", "role"]
    );
}

#[tokio::test]
async fn test_signup_duplicate_username_and_email() {
    let app = TestApp::new().await;
    signup_developer(&app.server, "ada").await;

    let response = app.server.post("/api/auth/signup").json(&signup_body("ada", "developer")).await;
    crate::assert_error_msg!(response, StatusCode::CONFLICT, "Username already taken");

    let mut body = signup_body("ada2", "developer");
    body["email"] = json!("ada@example.com");
    let response = app.server.post("/api/auth/signup").json(&body).await;
    crate::assert_error_msg!(response, StatusCode::CONFLICT, "Email already registered");
}

#[tokio::test]
async fn test_login_by_email_and_username() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;

    for identity in [json!({ "email": "ada@example.com" }), json!({ "username": "ada" })] {
        let mut body = identity;
        body["password"] = json!(TEST_PASSWORD);

        let response = app.server.post("/api/auth/login").json(&body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["user"]["id"], ada.id.as_str());
    }
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_look_the_same() {
    let app = TestApp::new().await;
    signup_developer(&app.server, "ada").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrongpassword" }))
        .await;
    crate::assert_error_msg!(wrong_password, StatusCode::UNAUTHORIZED, "Invalid Credentials");

    let unknown = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .await;
    crate::assert_error_msg!(unknown, StatusCode::UNAUTHORIZED, "Invalid Credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    let response = app.server.post("/api/auth/login").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new().await;

    let missing = app.server.get("/api/auth/me").await;
    crate::assert_error_msg!(missing, StatusCode::UNAUTHORIZED, "No valid token, authorization denied");

    let garbage = app.server.get("/api/auth/me").authorization_bearer("not-a-token").await;
    garbage.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_me() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;

    let response = app.server.get("/api/auth/me").authorization_bearer(&ada.token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_delete_me_refused_while_managing() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    app.create_project(&ada, "Tracker").await;

    let response = app.server.delete("/api/auth/me").authorization_bearer(&ada.token).await;

    crate::assert_error_msg!(
        response,
        StatusCode::BAD_REQUEST,
        "You still manage projects. Reassign them before deleting your account."
    );
}

#[tokio::test]
async fn test_delete_me_removes_developer_from_projects() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);
    app.add_developer(&ada, &project_id, &grace).await;

    app.server
        .delete("/api/auth/me")
        .authorization_bearer(&grace.token)
        .await
        .assert_status_ok();

    let project: Value = app
        .server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(project["developers"], json!([]));

    // The token now names a user that no longer exists
    app.server
        .get("/api/auth/me")
        .authorization_bearer(&grace.token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_routes_are_admin_only() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app.server.get("/api/users").authorization_bearer(&ada.token).await;
    crate::assert_error_msg!(
        response,
        StatusCode::UNAUTHORIZED,
        "You are not permitted to perform this action."
    );

    let admin = login_admin(&app.server).await;
    let response = app.server.get("/api/users").authorization_bearer(&admin.token).await;
    response.assert_status_ok();
    let users: Vec<Value> = response.json();
    let names: Vec<&str> = users.iter().filter_map(|u| u["username"].as_str()).collect();
    assert!(names.contains(&"ada"));
    assert!(names.contains(&ADMIN_USERNAME));
}

#[tokio::test]
async fn test_admin_changes_role() {
    let app = TestApp::new().await;
    let admin = login_admin(&app.server).await;
    let grace = signup_developer(&app.server, "grace").await;

    let response = app
        .server
        .put(&format!("/api/users/{}/role", grace.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "role": "manager" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "manager");

    let response = app
        .server
        .put(&format!("/api/users/{}/role", grace.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "role": "overlord" }))
        .await;
    crate::assert_field_errors!(response, StatusCode::UNPROCESSABLE_ENTITY, ["role"]);
}

#[tokio::test]
async fn test_delete_me_clears_assignments() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);
    app.add_developer(&ada, &project_id, &grace).await;
    let ticket = app.create_ticket(&ada, &project_id, "Crash on save").await;
    let ticket_id = id_of(&ticket);
    let sprint = app.create_sprint(&ada, &project_id, "Sprint 1").await;
    let sprint_id = id_of(&sprint);

    app.server
        .put(&format!("/api/tickets/{project_id}/{ticket_id}"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "assignedDeveloper": grace.id, "history": "UpdateAssignedDev" }))
        .await
        .assert_status_ok();
    app.server
        .put(&format!("/api/sprints/{sprint_id}"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "developers": [grace.id, ada.id] }))
        .await
        .assert_status_ok();

    app.server
        .delete("/api/auth/me")
        .authorization_bearer(&grace.token)
        .await
        .assert_status_ok();

    let ticket: Value = app
        .server
        .get(&format!("/api/tickets/{ticket_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(ticket["assignedDeveloper"], Value::Null);
    let sprint: Value = app
        .server
        .get(&format!("/api/sprints/{sprint_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(sprint["developers"], json!([ada.id]));
}

#[tokio::test]
async fn test_last_admin_keeps_the_role() {
    let app = TestApp::new().await;
    let admin = login_admin(&app.server).await;

    let response = app
        .server
        .put(&format!("/api/users/{}/role", admin.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "role": "developer" }))
        .await;
    crate::assert_error_msg!(response, StatusCode::BAD_REQUEST, "At least one admin is required.");

    let response = app.server.delete("/api/auth/me").authorization_bearer(&admin.token).await;
    crate::assert_error_msg!(response, StatusCode::BAD_REQUEST, "At least one admin is required.");

    // With a second admin the first may step down
    let grace = signup_developer(&app.server, "grace").await;
    app.server
        .put(&format!("/api/users/{}/role", grace.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "role": "admin" }))
        .await
        .assert_status_ok();
    let response = app
        .server
        .put(&format!("/api/users/{}/role", admin.id))
        .authorization_bearer(&admin.token)
        .json(&json!({ "role": "developer" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["role"], "developer");
}
