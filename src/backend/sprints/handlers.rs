/**
 * Sprint Handlers
 *
 * HTTP handlers for `/api/sprints`.
 *
 * Sprints belong to one project. Their developers must be project members,
 * and only tickets of the same project can be attached. Creating, updating
 * and deleting sprints needs the project's manager or an admin; attaching and
 * detaching tickets is open to any project member.
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
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::projects::find_project;
use crate::backend::sprints::db;
use crate::backend::tickets::db::{get_ticket, tickets_by_ids};
use crate::backend::validation::{non_blank, CommentRequest, JsonBody, Validator};
use crate::shared::{Comment, Project, Sprint, SprintDetails};

pub const SPRINT_NOT_FOUND_MESSAGE: &str = "Sprint not found";

const DATE_ORDER: &str = "The sprint end date cannot be before the start date.";
const DEVELOPERS_NOT_MEMBERS: &str = "Sprint developers must be members of the project.";

/// Body of `POST /api/sprints/{project_id}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSprintRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub developers: Option<Vec<String>>,
}

/// Body of `PUT /api/sprints/{sprint_id}`; blank fields are left unchanged,
/// a present `developers` list replaces the current one
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSprintRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub developers: Option<Vec<String>>,
}

async fn find_sprint(pool: &SqlitePool, sprint_id: Uuid) -> Result<Sprint, BackendError> {
    db::get_sprint(pool, sprint_id)
        .await?
        .ok_or_else(|| BackendError::not_found(SPRINT_NOT_FOUND_MESSAGE))
}

/// Parse and check a developer id list against the project's members
fn sprint_developers(v: &mut Validator, project: &Project, raw: &[String]) -> Vec<Uuid> {
    let mut developers = Vec::with_capacity(raw.len());
    for entry in raw {
        match entry.trim().parse::<Uuid>() {
            Ok(id) if project.is_member(id) => {
                if !developers.contains(&id) {
                    developers.push(id);
                }
            }
            _ => {
                v.push("developers", DEVELOPERS_NOT_MEMBERS);
                return Vec::new();
            }
        }
    }
    developers
}

/// GET /api/sprints/project/{project_id}
pub async fn get_project_sprints(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Sprint>>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    Ok(Json(db::sprints_for_project(&pool, project.id).await?))
}

/// GET /api/sprints/{sprint_id}
///
/// Returns the sprint with its project summary and tickets populated.
pub async fn get_sprint(
    State(pool): State<SqlitePool>,
    Path(sprint_id): Path<Uuid>,
) -> Result<Json<SprintDetails>, BackendError> {
    let sprint = find_sprint(&pool, sprint_id).await?;
    let project = find_project(&pool, sprint.project).await?;
    let tickets = tickets_by_ids(&pool, &sprint.tickets).await?;
    Ok(Json(SprintDetails::new(sprint, project.summary(), tickets)))
}

/// POST /api/sprints/{project_id}
pub async fn create_sprint(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<CreateSprintRequest>,
) -> Result<Json<Sprint>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }

    let mut v = Validator::new();
    let title = v.required("title", request.title.as_deref(), "Please provide a sprint title.");
    let description = v.required(
        "description",
        request.description.as_deref(),
        "Please provide a sprint description.",
    );
    let start = v.date("dateStart", request.date_start.as_deref(), "Please provide a start date.");
    let end = v.date("dateEnd", request.date_end.as_deref(), "Please provide an end date.");
    if let (Some(start), Some(end)) = (start, end) {
        v.check(end >= start, "dateEnd", DATE_ORDER);
    }
    let developers = sprint_developers(&mut v, &project, request.developers.as_deref().unwrap_or_default());
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;

    let (Some(title), Some(description), Some(date_start), Some(date_end)) =
        (title, description, start, end)
    else {
        return Err(BackendError::bad_request("Invalid sprint request"));
    };

    let now = Utc::now();
    let sprint = Sprint {
        id: Uuid::new_v4(),
        project: project.id,
        title,
        description,
        date_start,
        date_end,
        developers,
        tickets: Vec::new(),
        comments: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    db::insert_sprint(&pool, &sprint).await?;
    tracing::info!("Sprint '{}' created in project {} by {}", sprint.title, project.id, user.username);
    Ok(Json(sprint))
}

/// PUT /api/sprints/{sprint_id}
pub async fn update_sprint(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(sprint_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateSprintRequest>,
) -> Result<Json<Sprint>, BackendError> {
    let mut sprint = find_sprint(&pool, sprint_id).await?;
    let project = find_project(&pool, sprint.project).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }

    let mut v = Validator::new();
    let start = v.date_optional("dateStart", request.date_start.as_deref(), "Please provide a valid start date.");
    let end = v.date_optional("dateEnd", request.date_end.as_deref(), "Please provide a valid end date.");
    let new_start = start.unwrap_or(sprint.date_start);
    let new_end = end.unwrap_or(sprint.date_end);
    v.check(new_end >= new_start, "dateEnd", DATE_ORDER);
    let developers = request
        .developers
        .as_deref()
        .map(|raw| sprint_developers(&mut v, &project, raw));
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;
    let replace_developers = developers.is_some();

    if let Some(title) = non_blank(request.title.as_deref()) {
        sprint.title = title.to_string();
    }
    if let Some(description) = non_blank(request.description.as_deref()) {
        sprint.description = description.to_string();
    }
    sprint.date_start = new_start;
    sprint.date_end = new_end;
    if let Some(developers) = developers {
        sprint.developers = developers;
    }

    db::save_sprint(&pool, &mut sprint, replace_developers).await?;
    tracing::info!("Sprint {} updated by {}", sprint.id, user.username);
    Ok(Json(sprint))
}

/// PUT /api/sprints/{sprint_id}/tickets/{ticket_id}
pub async fn add_ticket(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((sprint_id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Sprint>, BackendError> {
    let mut sprint = find_sprint(&pool, sprint_id).await?;
    let project = find_project(&pool, sprint.project).await?;
    if !user.can_contribute(&project) {
        return Err(BackendError::not_permitted());
    }

    let ticket = get_ticket(&pool, ticket_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Ticket not found"))?;
    if ticket.project != sprint.project {
        return Err(BackendError::bad_request(
            "Only tickets from the sprint's project can be added to it.",
        ));
    }
    sprint.tickets = db::TICKETS
        .push_unique(&pool, sprint.id, ticket.id, &ticket.id)
        .await?
        .ok_or_else(|| BackendError::bad_request("That ticket is already on this sprint."))?;

    Ok(Json(sprint))
}

/// DELETE /api/sprints/{sprint_id}/tickets/{ticket_id}
pub async fn remove_ticket(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((sprint_id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Sprint>, BackendError> {
    let mut sprint = find_sprint(&pool, sprint_id).await?;
    let project = find_project(&pool, sprint.project).await?;
    if !user.can_contribute(&project) {
        return Err(BackendError::not_permitted());
    }
    sprint.tickets = db::TICKETS
        .remove(&pool, sprint.id, ticket_id)
        .await?
        .ok_or_else(|| BackendError::not_found("That ticket is not on this sprint."))?;

    Ok(Json(sprint))
}

/// PUT /api/sprints/comment/{sprint_id}
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(sprint_id): Path<Uuid>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let text = request.text()?;
    let comment = Comment::new(user.user_id, &user.name, text);

    let comments = db::COMMENTS
        .push(&pool, sprint_id, &comment)
        .await?
        .ok_or_else(|| BackendError::not_found(SPRINT_NOT_FOUND_MESSAGE))?;

    Ok(Json(comments))
}

/// DELETE /api/sprints/{project_id}/{sprint_id}
pub async fn delete_sprint(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((project_id, sprint_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }
    let sprint = find_sprint(&pool, sprint_id).await?;
    if sprint.project != project.id {
        return Err(BackendError::not_found(SPRINT_NOT_FOUND_MESSAGE));
    }

    db::delete_sprint(&pool, sprint.id).await?;
    tracing::info!("Sprint '{}' deleted by {}", sprint.title, user.username);
    Ok(Json(MessageResponse::new("This sprint has been deleted.")))
}
