//! Profile API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

async fn create_profile(app: &TestApp, user: &TestUser, skills: Value) -> Value {
    let response = app
        .server
        .post("/api/profiles")
        .authorization_bearer(&user.token)
        .json(&json!({ "bio": format!("I am {}", user.username), "skills": skills }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_create_and_update_own_profile() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;

    let profile = create_profile(&app, &ada, json!("Rust, SQL, ,rust")).await;
    assert_eq!(profile["user"]["username"], "ada");
    assert_eq!(profile["skills"], json!(["Rust", "SQL"]));

    let updated: Value = app
        .server
        .post("/api/profiles")
        .authorization_bearer(&ada.token)
        .json(&json!({ "skills": ["Go"] }))
        .await
        .json();
    assert_eq!(updated["id"], profile["id"]);
    assert_eq!(updated["bio"], "I am ada");
    assert_eq!(updated["skills"], json!(["Go"]));

    let mine: Value = app
        .server
        .get("/api/profiles/me")
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(mine["skills"], json!(["Go"]));
}

#[tokio::test]
async fn test_missing_profile_is_not_found() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;

    app.server
        .get("/api/profiles/me")
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("/api/profiles/user/{}", ada.id))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_by_skill() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    create_profile(&app, &ada, json!(["Rust", "Axum"])).await;
    create_profile(&app, &grace, json!(["COBOL"])).await;

    let all: Vec<Value> = app
        .server
        .get("/api/profiles")
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(all.len(), 2);

    let rustaceans: Vec<Value> = app
        .server
        .get("/api/profiles")
        .add_query_param("search", "rust")
        .authorization_bearer(&grace.token)
        .await
        .json();
    assert_eq!(rustaceans.len(), 1);
    assert_eq!(rustaceans[0]["user"]["username"], "ada");
}

#[tokio::test]
async fn test_profile_comments() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;
    let grace = signup_manager(&app.server, "grace").await;
    create_profile(&app, &ada, json!([])).await;

    let comments: Vec<Value> = app
        .server
        .put(&format!("/api/profiles/comment/{}", ada.id))
        .authorization_bearer(&grace.token)
        .json(&json!({ "text": "Great reviewer" }))
        .await
        .json();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["user"], grace.id.as_str());

    let profile: Value = app
        .server
        .get(&format!("/api/profiles/user/{}", ada.id))
        .authorization_bearer(&grace.token)
        .await
        .json();
    assert_eq!(profile["comments"][0]["text"], "Great reviewer");
}

#[tokio::test]
async fn test_profile_deletion_rules() {
    let app = TestApp::new().await;
    let ada = signup_developer(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let admin = login_admin(&app.server).await;
    create_profile(&app, &ada, json!([])).await;
    create_profile(&app, &grace, json!([])).await;

    app.server
        .delete(&format!("/api/profiles/user/{}", ada.id))
        .authorization_bearer(&grace.token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .delete(&format!("/api/profiles/user/{}", ada.id))
        .authorization_bearer(&admin.token)
        .await
        .assert_status_ok();

    app.server
        .delete("/api/profiles")
        .authorization_bearer(&grace.token)
        .await
        .assert_status_ok();

    let remaining: Vec<Value> = app
        .server
        .get("/api/profiles")
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert!(remaining.is_empty());
}
