//! Test app fixture
//!
//! Every `TestApp` builds its own app on `sqlite::memory:`, so tests never
//! share data and need no cleanup. `TestApp::with_database_url` points one at
//! a file database instead, for tests that need a real connection pool.

use axum::Router;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use devtracker::backend::server::create_app;
use devtracker::shared::AppConfig;

use super::auth_helpers::TestUser;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "adminpassword";

pub struct TestApp {
    pub server: TestServer,
    /// The same app as `server`, for driving requests concurrently
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_database_url("sqlite::memory:").await
    }

    pub async fn with_database_url(url: &str) -> Self {
        let config = AppConfig::builder()
            .database_url(url)
            .max_connections(8)
            .jwt_secret("integration-test-secret")
            .bcrypt_cost(4)
            .admin(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD)
            .build()
            .expect("valid test config");
        let router = create_app(config).await.expect("app starts");

        Self {
            server: TestServer::new(router.clone()).expect("test server"),
            router,
        }
    }

    /// Create a project managed by `manager` and return its JSON
    pub async fn create_project(&self, manager: &TestUser, name: &str) -> Value {
        let response = self
            .server
            .post("/api/projects")
            .authorization_bearer(&manager.token)
            .json(&json!({
                "name": name,
                "description": format!("{name} description"),
                "targetCompletionDate": future_date(),
                "manager": manager.id,
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Add `developer` to the project as its manager
    pub async fn add_developer(&self, manager: &TestUser, project_id: &str, developer: &TestUser) {
        self.server
            .put(&format!("/api/projects/{project_id}/developers"))
            .authorization_bearer(&manager.token)
            .json(&json!({ "user": developer.id }))
            .await
            .assert_status_ok();
    }

    /// Create a ticket in the project and return its JSON
    pub async fn create_ticket(&self, author: &TestUser, project_id: &str, title: &str) -> Value {
        let response = self
            .server
            .post(&format!("/api/tickets/{project_id}"))
            .authorization_bearer(&author.token)
            .json(&json!({
                "title": title,
                "type": "Bug",
                "description": format!("{title} description"),
                "priority": "High",
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Create a two-week sprint in the project and return its JSON
    pub async fn create_sprint(&self, manager: &TestUser, project_id: &str, title: &str) -> Value {
        let start = Utc::now();
        let end = start + Duration::days(14);
        let response = self
            .server
            .post(&format!("/api/sprints/{project_id}"))
            .authorization_bearer(&manager.token)
            .json(&json!({
                "title": title,
                "description": "Sprint goal",
                "dateStart": start.to_rfc3339(),
                "dateEnd": end.to_rfc3339(),
            }))
            .await;
        response.assert_status_ok();
        response.json()
    }
}

/// A target date safely in the future
pub fn future_date() -> String {
    (Utc::now() + Duration::days(90)).to_rfc3339()
}

/// String id of a JSON document
pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("document id").to_string()
}
