/**
 * Project Handlers
 *
 * HTTP handlers for `/api/projects`.
 *
 * # Access Rules
 *
 * - Any authenticated user may read projects, create one, and comment
 * - Updating, deleting and managing developers needs the project's manager
 *   or an admin
 * - A project comment can be deleted by its author or an admin
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::MessageResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::projects::db;
use crate::backend::validation::{non_blank, CommentRequest, JsonBody, Validator};
use crate::shared::{Comment, Project, ProjectDeveloper};

pub const DUPLICATE_NAME_MESSAGE: &str =
    "A project with that name already exists. Please choose another name.";
pub const NO_PROJECTS_MESSAGE: &str = "There are no projects available for this user.";
pub const PROJECT_NOT_FOUND_MESSAGE: &str = "Project not found";

const MANAGER_REQUIRED: &str =
    "A manager is required for the project. Select the Add Self button to assign yourself as manager.";
const MANAGER_UNKNOWN: &str = "The selected manager is not a registered user.";

/// Body of `POST /api/projects`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_completion_date: Option<String>,
    pub manager: Option<String>,
}

/// Body of `PUT /api/projects/{project_id}`; blank fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_completion_date: Option<String>,
    pub completion_date: Option<String>,
    pub manager: Option<String>,
}

/// Body of `PUT /api/projects/{project_id}/developers`
#[derive(Debug, Default, Deserialize)]
pub struct AddDeveloperRequest {
    pub user: Option<String>,
}

/// Load a project; an unknown id is a 400 "Project not found"
pub async fn find_project(pool: &SqlitePool, project_id: Uuid) -> Result<Project, BackendError> {
    db::get_project(pool, project_id)
        .await?
        .ok_or_else(|| BackendError::bad_request(PROJECT_NOT_FOUND_MESSAGE))
}

/// GET /api/projects/me
pub async fn get_my_projects(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Project>>, BackendError> {
    let projects = db::projects_for_user(&pool, user.user_id).await?;
    if projects.is_empty() {
        return Err(BackendError::bad_request(NO_PROJECTS_MESSAGE));
    }
    Ok(Json(projects))
}

/// GET /api/projects/{project_id}
pub async fn get_project(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, BackendError> {
    Ok(Json(find_project(&pool, project_id).await?))
}

/// POST /api/projects
///
/// # Errors
///
/// * `422 Unprocessable Entity` - One entry per missing or invalid field
/// * `400 Bad Request` - The name is already used by another project
pub async fn create_project(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateProjectRequest>,
) -> Result<Json<Project>, BackendError> {
    let mut v = Validator::new();
    let name = v.required("name", request.name.as_deref(), "Please provide a project name.");
    let description = v.required(
        "description",
        request.description.as_deref(),
        "Please provide a project description.",
    );
    let target = v.date(
        "targetCompletionDate",
        request.target_completion_date.as_deref(),
        "Please provide a target date in the future.",
    );
    if let Some(target) = target {
        v.check(
            target > Utc::now(),
            "targetCompletionDate",
            "Please provide a target date in the future.",
        );
    }
    let manager = v.parse::<Uuid>("manager", request.manager.as_deref(), MANAGER_REQUIRED);
    if let Some(manager) = manager {
        v.check(
            get_user_by_id(&pool, manager).await?.is_some(),
            "manager",
            MANAGER_UNKNOWN,
        );
    }
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;

    let (Some(name), Some(description), Some(target), Some(manager)) =
        (name, description, target, manager)
    else {
        return Err(BackendError::bad_request("Invalid project request"));
    };

    if db::name_taken(&pool, &name, None).await? {
        return Err(BackendError::bad_request(DUPLICATE_NAME_MESSAGE));
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        creator: user.user_id,
        name,
        description,
        target_completion_date: target,
        completion_date: None,
        manager,
        developers: Vec::new(),
        comments: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    db::insert_project(&pool, &project)
        .await
        .map_err(|e| duplicate_name_or(e.into()))?;

    tracing::info!("Project '{}' created by {}", project.name, user.username);
    Ok(Json(project))
}

/// PUT /api/projects/{project_id}
pub async fn update_project(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateProjectRequest>,
) -> Result<Json<Project>, BackendError> {
    let mut v = Validator::new();
    let target = v.date_optional(
        "targetCompletionDate",
        request.target_completion_date.as_deref(),
        "Please provide a valid target date.",
    );
    let completion = v.date_optional(
        "completionDate",
        request.completion_date.as_deref(),
        "Please provide a valid completion date.",
    );
    let manager = v.parse_optional::<Uuid>(
        "manager",
        request.manager.as_deref(),
        MANAGER_UNKNOWN,
    );
    if let Some(manager) = manager {
        v.check(
            get_user_by_id(&pool, manager).await?.is_some(),
            "manager",
            MANAGER_UNKNOWN,
        );
    }
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;

    let mut project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }

    if let Some(name) = non_blank(request.name.as_deref()) {
        if name != project.name {
            if db::name_taken(&pool, name, Some(project.id)).await? {
                return Err(BackendError::bad_request(DUPLICATE_NAME_MESSAGE));
            }
            project.name = name.to_string();
        }
    }
    if let Some(description) = non_blank(request.description.as_deref()) {
        project.description = description.to_string();
    }
    if let Some(target) = target {
        project.target_completion_date = target;
    }
    if completion.is_some() {
        project.completion_date = completion;
    }
    if let Some(manager) = manager {
        project.manager = manager;
    }

    db::save_project(&pool, &mut project)
        .await
        .map_err(|e| duplicate_name_or(e.into()))?;

    tracing::info!("Project {} updated by {}", project.id, user.username);
    Ok(Json(project))
}

/// PUT /api/projects/{project_id}/developers
pub async fn add_developer(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<AddDeveloperRequest>,
) -> Result<Json<Project>, BackendError> {
    let mut v = Validator::new();
    let developer = v.parse::<Uuid>("user", request.user.as_deref(), "Please select a developer to add.");
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;
    let Some(developer) = developer else {
        return Err(BackendError::bad_request("Please select a developer to add."));
    };

    let mut project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }
    if get_user_by_id(&pool, developer).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }

    let entry = ProjectDeveloper {
        user: developer,
        added_at: Utc::now(),
    };
    project.developers = db::DEVELOPERS
        .push_unique(&pool, project.id, developer, &entry)
        .await?
        .ok_or_else(|| BackendError::bad_request("That user is already a developer on this project."))?;

    tracing::info!("Developer {} added to project {}", developer, project.id);
    Ok(Json(project))
}

/// DELETE /api/projects/{project_id}/developers/{user_id}
pub async fn remove_developer(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((project_id, developer)): Path<(Uuid, Uuid)>,
) -> Result<Json<Project>, BackendError> {
    let mut project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }

    project.developers = db::remove_developer(&pool, &project, developer)
        .await?
        .ok_or_else(|| BackendError::not_found("That user is not a developer on this project."))?;

    tracing::info!("Developer {} removed from project {}", developer, project.id);
    Ok(Json(project))
}

/// PUT /api/projects/comment/{project_id}
///
/// Returns the full comment list, oldest first.
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let text = request.text()?;
    let comment = Comment::new(user.user_id, &user.name, text);

    let comments = db::COMMENTS
        .push(&pool, project_id, &comment)
        .await?
        .ok_or_else(|| BackendError::bad_request(PROJECT_NOT_FOUND_MESSAGE))?;

    Ok(Json(comments))
}

/// DELETE /api/projects/comment/{project_id}/{comment_id}
pub async fn delete_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((project_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let project = find_project(&pool, project_id).await?;

    let comment = project
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| BackendError::not_found("Comment does not exist"))?;
    if comment.user != user.user_id && !user.is_admin() {
        return Err(BackendError::not_permitted());
    }

    let comments = db::COMMENTS
        .remove(&pool, project.id, comment_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment does not exist"))?;

    Ok(Json(comments))
}

/// DELETE /api/projects/{project_id}
///
/// Also deletes the project's sprints and tickets.
pub async fn delete_project(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }

    db::delete_project(&pool, project.id).await?;
    tracing::info!("Project '{}' deleted by {}", project.name, user.username);

    Ok(Json(MessageResponse::new("This project has been deleted.")))
}

/// Report a unique-index hit on `projects.name` like the explicit check
fn duplicate_name_or(err: BackendError) -> BackendError {
    if err.is_unique_violation() {
        BackendError::bad_request(DUPLICATE_NAME_MESSAGE)
    } else {
        err
    }
}
