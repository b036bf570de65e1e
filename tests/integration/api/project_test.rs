//! Project API integration tests

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::*;

const DUPLICATE_NAME: &str = "A project with that name already exists. Please choose another name.";
const NOT_PERMITTED: &str = "You are not permitted to perform this action.";

#[tokio::test]
async fn test_create_and_list_my_projects() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let project = app.create_project(&ada, "Tracker").await;
    assert_eq!(project["name"], "Tracker");
    assert_eq!(project["manager"], ada.id.as_str());
    assert_eq!(project["creator"], ada.id.as_str());
    assert_eq!(project["developers"], json!([]));

    let response = app.server.get("/api/projects/me").authorization_bearer(&ada.token).await;
    response.assert_status_ok();
    let projects: Vec<Value> = response.json();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], project["id"]);
}

#[tokio::test]
async fn test_my_projects_empty_is_bad_request() {
    let app = TestApp::new().await;
    let grace = signup_developer(&app.server, "grace").await;

    let response = app.server.get("/api/projects/me").authorization_bearer(&grace.token).await;

    crate::assert_error_msg!(
        response,
        StatusCode::BAD_REQUEST,
        "There are no projects available for this user."
    );
}

#[tokio::test]
async fn test_developer_sees_project_after_being_added() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    app.add_developer(&ada, &id_of(&project), &grace).await;

    let projects: Vec<Value> = app
        .server
        .get("/api/projects/me")
        .authorization_bearer(&grace.token)
        .await
        .json();

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["developers"][0]["user"], grace.id.as_str());
}

#[tokio::test]
async fn test_duplicate_project_name_is_rejected() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    app.create_project(&ada, "Tracker").await;

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "name": "Tracker",
            "description": "Second one",
            "targetCompletionDate": future_date(),
            "manager": ada.id,
        }))
        .await;

    crate::assert_error_msg!(response, StatusCode::BAD_REQUEST, DUPLICATE_NAME);
}

#[tokio::test]
async fn test_rename_onto_existing_name_is_rejected() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    app.create_project(&ada, "Tracker").await;
    let other = app.create_project(&ada, "Planner").await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", id_of(&other)))
        .authorization_bearer(&ada.token)
        .json(&json!({ "name": "Tracker" }))
        .await;

    crate::assert_error_msg!(response, StatusCode::BAD_REQUEST, DUPLICATE_NAME);
}

#[tokio::test]
async fn test_missing_fields_yield_field_errors() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(&ada.token)
        .json(&json!({}))
        .await;

    crate::assert_field_errors!(
        response,
        StatusCode::UNPROCESSABLE_ENTITY,
        ["name", "description", "targetCompletionDate", "manager"]
    );
}

#[tokio::test]
async fn test_wrongly_typed_field_names_the_field() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "name": 123,
            "description": "Numbers for names",
            "targetCompletionDate": future_date(),
            "manager": ada.id,
        }))
        .await;

    crate::assert_field_errors!(response, StatusCode::UNPROCESSABLE_ENTITY, ["name"]);
}

#[tokio::test]
async fn test_malformed_body_is_a_json_error() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(&ada.token)
        .bytes("{\"name\": ".into())
        .content_type("application/json")
        .await;

    crate::assert_field_errors!(response, StatusCode::BAD_REQUEST, ["body"]);
    let body: Value = response.json();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_target_date_must_be_in_the_future() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app
        .server
        .post("/api/projects")
        .authorization_bearer(&ada.token)
        .json(&json!({
            "name": "Tracker",
            "description": "Late already",
            "targetCompletionDate": (Utc::now() - Duration::days(1)).to_rfc3339(),
            "manager": ada.id,
        }))
        .await;

    crate::assert_field_errors!(response, StatusCode::UNPROCESSABLE_ENTITY, ["targetCompletionDate"]);
}

#[tokio::test]
async fn test_unknown_project_is_bad_request() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;

    let response = app
        .server
        .get(&format!("/api/projects/{}", Uuid::new_v4()))
        .authorization_bearer(&ada.token)
        .await;

    crate::assert_error_msg!(response, StatusCode::BAD_REQUEST, "Project not found");
}

#[tokio::test]
async fn test_update_project_details() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_manager(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", id_of(&project)))
        .authorization_bearer(&ada.token)
        .json(&json!({ "description": "Reworked", "manager": grace.id, "name": "" }))
        .await;

    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["name"], "Tracker");
    assert_eq!(updated["description"], "Reworked");
    assert_eq!(updated["manager"], grace.id.as_str());

    // Ada no longer manages it
    app.server
        .put(&format!("/api/projects/{}", id_of(&project)))
        .authorization_bearer(&ada.token)
        .json(&json!({ "description": "Again" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_manager_cannot_delete_project() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    app.add_developer(&ada, &id_of(&project), &grace).await;

    let response = app
        .server
        .delete(&format!("/api/projects/{}", id_of(&project)))
        .authorization_bearer(&grace.token)
        .await;

    crate::assert_error_msg!(response, StatusCode::UNAUTHORIZED, NOT_PERMITTED);
}

#[tokio::test]
async fn test_admin_can_delete_any_project() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let admin = login_admin(&app.server).await;
    let project = app.create_project(&ada, "Tracker").await;

    let response = app
        .server
        .delete(&format!("/api/projects/{}", id_of(&project)))
        .authorization_bearer(&admin.token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["msg"], "This project has been deleted.");
}

#[tokio::test]
async fn test_deleting_project_removes_tickets_and_sprints() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);
    let ticket = app.create_ticket(&ada, &project_id, "Crash on save").await;
    let sprint = app.create_sprint(&ada, &project_id, "Sprint 1").await;

    app.server
        .delete(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status_ok();

    app.server
        .get(&format!("/api/tickets/{}", id_of(&ticket)))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("/api/sprints/{}", id_of(&sprint)))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_developer_membership_changes() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);
    app.add_developer(&ada, &project_id, &grace).await;

    let again = app
        .server
        .put(&format!("/api/projects/{project_id}/developers"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "user": grace.id }))
        .await;
    again.assert_status(StatusCode::BAD_REQUEST);

    let by_developer = app
        .server
        .delete(&format!("/api/projects/{project_id}/developers/{}", grace.id))
        .authorization_bearer(&grace.token)
        .await;
    by_developer.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .delete(&format!("/api/projects/{project_id}/developers/{}", grace.id))
        .authorization_bearer(&ada.token)
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["developers"], json!([]));
}

#[tokio::test]
async fn test_comments_are_kept_in_arrival_order() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);

    for (user, text) in [(&ada, "first"), (&grace, "second"), (&ada, "third")] {
        app.server
            .put(&format!("/api/projects/comment/{project_id}"))
            .authorization_bearer(&user.token)
            .json(&json!({ "text": text }))
            .await
            .assert_status_ok();
    }

    let project: Value = app
        .server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    let texts: Vec<&str> = project["comments"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["text"].as_str())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(project["comments"][1]["user"], grace.id.as_str());
}

#[tokio::test]
async fn test_concurrent_comments_are_all_kept() {
    const WRITERS: usize = 40;

    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("tracker.db").display());
    let app = TestApp::with_database_url(&url).await;
    let ada = signup_manager(&app.server, "ada").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);

    let mut writers = JoinSet::new();
    for n in 0..WRITERS {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/projects/comment/{project_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", ada.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "text": format!("comment {n}") }).to_string()))
            .unwrap();
        writers.spawn(app.router.clone().oneshot(request));
    }
    while let Some(response) = writers.join_next().await {
        assert_eq!(response.unwrap().unwrap().status(), StatusCode::OK);
    }

    let project: Value = app
        .server
        .get(&format!("/api/projects/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    let comments = project["comments"].as_array().unwrap();
    assert_eq!(comments.len(), WRITERS);
    for n in 0..WRITERS {
        let text = format!("comment {n}");
        assert!(comments.iter().any(|c| c["text"] == text.as_str()), "lost {text}");
    }
}

#[tokio::test]
async fn test_removed_developer_loses_assignments() {
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
        .json(&json!({ "developers": [grace.id] }))
        .await
        .assert_status_ok();

    app.server
        .delete(&format!("/api/projects/{project_id}/developers/{}", grace.id))
        .authorization_bearer(&ada.token)
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
    assert_eq!(sprint["developers"], json!([]));
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let project = app.create_project(&ada, "Tracker").await;

    let response = app
        .server
        .put(&format!("/api/projects/comment/{}", id_of(&project)))
        .authorization_bearer(&ada.token)
        .json(&json!({ "text": "   " }))
        .await;

    crate::assert_field_errors!(response, StatusCode::BAD_REQUEST, ["text"]);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["msg"], "Please provide text in the comment field.");
}

#[tokio::test]
async fn test_only_author_or_admin_deletes_comment() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let admin = login_admin(&app.server).await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);

    let comments: Vec<Value> = app
        .server
        .put(&format!("/api/projects/comment/{project_id}"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "text": "mine" }))
        .await
        .json();
    let comment_id = id_of(&comments[0]);

    app.server
        .delete(&format!("/api/projects/comment/{project_id}/{comment_id}"))
        .authorization_bearer(&grace.token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .delete(&format!("/api/projects/comment/{project_id}/{comment_id}"))
        .authorization_bearer(&admin.token)
        .await;
    response.assert_status_ok();
    let remaining: Vec<Value> = response.json();
    assert!(remaining.is_empty());

    app.server
        .delete(&format!("/api/projects/comment/{project_id}/{comment_id}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
