//! Sprint API integration tests

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::*;

#[tokio::test]
async fn test_sprint_details_populate_project_and_tickets() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let project = app.create_project(&ada, "Tracker").await;
    let project_id = id_of(&project);
    let ticket = app.create_ticket(&ada, &project_id, "Crash on save").await;
    let sprint = app.create_sprint(&ada, &project_id, "Sprint 1").await;
    let sprint_id = id_of(&sprint);

    app.server
        .put(&format!("/api/sprints/{sprint_id}/tickets/{}", id_of(&ticket)))
        .authorization_bearer(&ada.token)
        .await
        .assert_status_ok();

    let details: Value = app
        .server
        .get(&format!("/api/sprints/{sprint_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert_eq!(details["project"]["name"], "Tracker");
    assert_eq!(details["project"]["id"], project_id.as_str());
    assert_eq!(details["tickets"][0]["title"], "Crash on save");
}

#[tokio::test]
async fn test_developer_cannot_create_sprint() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project = app.create_project(&ada, "Tracker").await;
    app.add_developer(&ada, &id_of(&project), &grace).await;

    let response = app
        .server
        .post(&format!("/api/sprints/{}", id_of(&project)))
        .authorization_bearer(&grace.token)
        .json(&json!({
            "title": "Mine",
            "description": "Sneaky",
            "dateStart": "2030-01-01",
            "dateEnd": "2030-01-14",
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sprint_validation() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let stranger = signup_developer(&app.server, "linus").await;
    let project = app.create_project(&ada, "Tracker").await;

    let start = Utc::now();
    let response = app
        .server
        .post(&format!("/api/sprints/{}", id_of(&project)))
        .authorization_bearer(&ada.token)
        .json(&json!({
            "title": "Backwards",
            "description": "Ends before it starts",
            "dateStart": start.to_rfc3339(),
            "dateEnd": (start - Duration::days(1)).to_rfc3339(),
            "developers": [stranger.id],
        }))
        .await;

    crate::assert_field_errors!(response, StatusCode::UNPROCESSABLE_ENTITY, ["dateEnd", "developers"]);
}

#[tokio::test]
async fn test_sprint_ticket_attachment_rules() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let tracker = id_of(&app.create_project(&ada, "Tracker").await);
    let planner = id_of(&app.create_project(&ada, "Planner").await);
    let own = id_of(&app.create_ticket(&ada, &tracker, "Own ticket").await);
    let foreign = id_of(&app.create_ticket(&ada, &planner, "Foreign ticket").await);
    let sprint = id_of(&app.create_sprint(&ada, &tracker, "Sprint 1").await);

    app.server
        .put(&format!("/api/sprints/{sprint}/tickets/{foreign}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .put(&format!("/api/sprints/{sprint}/tickets/{own}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status_ok();
    app.server
        .put(&format!("/api/sprints/{sprint}/tickets/{own}"))
        .authorization_bearer(&ada.token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .delete(&format!("/api/sprints/{sprint}/tickets/{own}"))
        .authorization_bearer(&ada.token)
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["tickets"], json!([]));
}

#[tokio::test]
async fn test_update_sprint() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let grace = signup_developer(&app.server, "grace").await;
    let project_id = id_of(&app.create_project(&ada, "Tracker").await);
    app.add_developer(&ada, &project_id, &grace).await;
    let sprint = id_of(&app.create_sprint(&ada, &project_id, "Sprint 1").await);

    let response = app
        .server
        .put(&format!("/api/sprints/{sprint}"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "title": "Sprint One", "developers": [grace.id] }))
        .await;

    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Sprint One");
    assert_eq!(updated["developers"], json!([grace.id]));
    assert_eq!(updated["description"], "Sprint goal");
}

#[tokio::test]
async fn test_sprint_comments_and_delete() {
    let app = TestApp::new().await;
    let ada = signup_manager(&app.server, "ada").await;
    let project_id = id_of(&app.create_project(&ada, "Tracker").await);
    let sprint = id_of(&app.create_sprint(&ada, &project_id, "Sprint 1").await);

    let comments: Vec<Value> = app
        .server
        .put(&format!("/api/sprints/comment/{sprint}"))
        .authorization_bearer(&ada.token)
        .json(&json!({ "text": "Kickoff" }))
        .await
        .json();
    assert_eq!(comments[0]["text"], "Kickoff");

    let response = app
        .server
        .delete(&format!("/api/sprints/{project_id}/{sprint}"))
        .authorization_bearer(&ada.token)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["msg"], "This sprint has been deleted.");

    let sprints: Vec<Value> = app
        .server
        .get(&format!("/api/sprints/project/{project_id}"))
        .authorization_bearer(&ada.token)
        .await
        .json();
    assert!(sprints.is_empty());
}
