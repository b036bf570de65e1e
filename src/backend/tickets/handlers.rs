/**
 * Ticket Handlers
 *
 * HTTP handlers for `/api/tickets`.
 *
 * # History
 *
 * Every write that changes a ticket appends a `HistoryEntry`: creation
 * records `Created`, and an update records the change type the client sent
 * along with one readable line per changed field, e.g.
 * `status: Open -> Completed`.
 *
 * # Access Rules
 *
 * - Reading and commenting: any authenticated user
 * - Creating and updating: project members and admins
 * - Deleting: the project's manager and admins
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::MessageResponse;
use crate::backend::auth::users::get_summaries;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::projects::find_project;
use crate::backend::tickets::db;
use crate::backend::validation::{non_blank, CommentRequest, JsonBody, Validator};
use crate::shared::{
    ChangeType, Comment, HistoryEntry, Project, Ticket, TicketPriority, TicketStatus, TicketType,
};

pub const TICKET_NOT_FOUND_MESSAGE: &str = "Ticket not found";

const NOT_A_MEMBER: &str = "The assigned developer must be a member of the project.";

/// Body of `POST /api/tickets/{project_id}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_developer: Option<String>,
    pub date_due: Option<String>,
}

/// Body of `PUT /api/tickets/{project_id}/{ticket_id}`
///
/// Blank fields are left unchanged; `history` names the kind of change.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_developer: Option<String>,
    pub resolution_summary: Option<String>,
    pub date_due: Option<String>,
    pub date_completed: Option<String>,
    pub history: Option<String>,
}

async fn find_ticket(pool: &SqlitePool, ticket_id: Uuid) -> Result<Ticket, BackendError> {
    db::get_ticket(pool, ticket_id)
        .await?
        .ok_or_else(|| BackendError::not_found(TICKET_NOT_FOUND_MESSAGE))
}

/// Load a ticket and make sure it belongs to `project`
async fn find_project_ticket(
    pool: &SqlitePool,
    project: &Project,
    ticket_id: Uuid,
) -> Result<Ticket, BackendError> {
    let ticket = find_ticket(pool, ticket_id).await?;
    if ticket.project != project.id {
        return Err(BackendError::not_found(TICKET_NOT_FOUND_MESSAGE));
    }
    Ok(ticket)
}

/// GET /api/tickets/me
pub async fn get_my_tickets(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Ticket>>, BackendError> {
    Ok(Json(db::tickets_assigned_to(&pool, user.user_id).await?))
}

/// GET /api/tickets/project/{project_id}
pub async fn get_project_tickets(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Ticket>>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    Ok(Json(db::tickets_for_project(&pool, project.id).await?))
}

/// GET /api/tickets/{ticket_id}
pub async fn get_ticket(
    State(pool): State<SqlitePool>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<Ticket>, BackendError> {
    Ok(Json(find_ticket(&pool, ticket_id).await?))
}

/// POST /api/tickets/{project_id}
pub async fn create_ticket(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<CreateTicketRequest>,
) -> Result<Json<Ticket>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_contribute(&project) {
        return Err(BackendError::not_permitted());
    }

    let mut v = Validator::new();
    let title = v.required("title", request.title.as_deref(), "Please provide a ticket title.");
    let ticket_type = v.parse::<TicketType>(
        "type",
        request.ticket_type.as_deref(),
        "Please select a ticket type (Bug, Feature, Task or Other).",
    );
    let description = v.required(
        "description",
        request.description.as_deref(),
        "Please provide a ticket description.",
    );
    let priority = v.parse::<TicketPriority>(
        "priority",
        request.priority.as_deref(),
        "Please select a priority (Low, Medium, High or Critical).",
    );
    let status = v
        .parse_optional::<TicketStatus>(
            "status",
            request.status.as_deref(),
            "Please select a valid status.",
        )
        .unwrap_or_default();
    let assigned = v.parse_optional::<Uuid>(
        "assignedDeveloper",
        request.assigned_developer.as_deref(),
        NOT_A_MEMBER,
    );
    if let Some(dev) = assigned {
        v.check(project.is_member(dev), "assignedDeveloper", NOT_A_MEMBER);
    }
    let date_due = v.date_optional("dateDue", request.date_due.as_deref(), "Please provide a valid due date.");
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;

    let (Some(title), Some(ticket_type), Some(description), Some(priority)) =
        (title, ticket_type, description, priority)
    else {
        return Err(BackendError::bad_request("Invalid ticket request"));
    };

    let now = Utc::now();
    let ticket = Ticket {
        id: Uuid::new_v4(),
        project: project.id,
        title,
        ticket_type,
        description,
        priority,
        status,
        assigned_developer: assigned,
        resolution_summary: None,
        date_due,
        date_completed: (status == TicketStatus::Completed).then_some(now),
        history: vec![HistoryEntry::new(ChangeType::Created, user.user_id, Vec::new())],
        comments: Vec::new(),
        created_by: user.user_id,
        created_at: now,
        updated_at: now,
    };

    db::insert_ticket(&pool, &ticket).await?;
    tracing::info!("Ticket '{}' created in project {} by {}", ticket.title, project.id, user.username);
    Ok(Json(ticket))
}

/// Parsed, validated form of an update request
#[derive(Debug, Default)]
struct TicketChanges {
    title: Option<String>,
    ticket_type: Option<TicketType>,
    description: Option<String>,
    priority: Option<TicketPriority>,
    status: Option<TicketStatus>,
    assigned_developer: Option<Uuid>,
    resolution_summary: Option<String>,
    date_due: Option<DateTime<Utc>>,
    date_completed: Option<DateTime<Utc>>,
}

fn date_label(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Apply `changes` to `ticket`, returning one line per field that changed
///
/// `names` maps the old and new assignee ids to a readable label.
fn apply_changes(
    ticket: &mut Ticket,
    changes: TicketChanges,
    names: impl Fn(Option<Uuid>) -> String,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(title) = changes.title.filter(|t| *t != ticket.title) {
        lines.push(format!("title: {} -> {}", ticket.title, title));
        ticket.title = title;
    }
    if let Some(kind) = changes.ticket_type.filter(|k| *k != ticket.ticket_type) {
        lines.push(format!("type: {} -> {}", ticket.ticket_type, kind));
        ticket.ticket_type = kind;
    }
    if let Some(description) = changes.description.filter(|d| *d != ticket.description) {
        lines.push("description updated".to_string());
        ticket.description = description;
    }
    if let Some(priority) = changes.priority.filter(|p| *p != ticket.priority) {
        lines.push(format!("priority: {} -> {}", ticket.priority, priority));
        ticket.priority = priority;
    }
    if let Some(dev) = changes.assigned_developer.filter(|d| Some(*d) != ticket.assigned_developer) {
        lines.push(format!(
            "assignedDeveloper: {} -> {}",
            names(ticket.assigned_developer),
            names(Some(dev))
        ));
        ticket.assigned_developer = Some(dev);
    }
    if let Some(summary) = changes
        .resolution_summary
        .filter(|s| Some(s) != ticket.resolution_summary.as_ref())
    {
        lines.push("resolutionSummary updated".to_string());
        ticket.resolution_summary = Some(summary);
    }
    if let Some(due) = changes.date_due.filter(|d| Some(*d) != ticket.date_due) {
        lines.push(format!("dateDue: {} -> {}", date_label(ticket.date_due), date_label(Some(due))));
        ticket.date_due = Some(due);
    }
    if let Some(status) = changes.status.filter(|s| *s != ticket.status) {
        lines.push(format!("status: {} -> {}", ticket.status, status));
        if ticket.status == TicketStatus::Completed && changes.date_completed.is_none() {
            ticket.date_completed = None;
        }
        ticket.status = status;
    }

    let completed = match changes.date_completed {
        Some(date) => Some(date),
        None if ticket.is_completed() && ticket.date_completed.is_none() => Some(Utc::now()),
        None => None,
    };
    if let Some(date) = completed.filter(|d| Some(*d) != ticket.date_completed) {
        lines.push(format!(
            "dateCompleted: {} -> {}",
            date_label(ticket.date_completed),
            date_label(Some(date))
        ));
        ticket.date_completed = Some(date);
    }

    lines
}

/// PUT /api/tickets/{project_id}/{ticket_id}
///
/// # Errors
///
/// * `422 Unprocessable Entity` - Missing change type or invalid field values
/// * `401 Unauthorized` - Caller is not a project member or admin
/// * `400 Bad Request` - Unknown project
/// * `404 Not Found` - The ticket is not in the project
pub async fn update_ticket(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((project_id, ticket_id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<UpdateTicketRequest>,
) -> Result<Json<Ticket>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_contribute(&project) {
        return Err(BackendError::not_permitted());
    }

    let mut v = Validator::new();
    let change_type = v.parse::<ChangeType>(
        "history",
        request.history.as_deref(),
        "Please select the type of change being made.",
    );
    let changes = TicketChanges {
        title: non_blank(request.title.as_deref()).map(str::to_string),
        ticket_type: v.parse_optional("type", request.ticket_type.as_deref(), "Please select a valid ticket type."),
        description: non_blank(request.description.as_deref()).map(str::to_string),
        priority: v.parse_optional("priority", request.priority.as_deref(), "Please select a valid priority."),
        status: v.parse_optional("status", request.status.as_deref(), "Please select a valid status."),
        assigned_developer: v.parse_optional(
            "assignedDeveloper",
            request.assigned_developer.as_deref(),
            NOT_A_MEMBER,
        ),
        resolution_summary: non_blank(request.resolution_summary.as_deref()).map(str::to_string),
        date_due: v.date_optional("dateDue", request.date_due.as_deref(), "Please provide a valid due date."),
        date_completed: v.date_optional(
            "dateCompleted",
            request.date_completed.as_deref(),
            "Please provide a valid completion date.",
        ),
    };
    if let Some(dev) = changes.assigned_developer {
        v.check(project.is_member(dev), "assignedDeveloper", NOT_A_MEMBER);
    }
    v.finish(StatusCode::UNPROCESSABLE_ENTITY)?;
    let Some(change_type) = change_type else {
        return Err(BackendError::bad_request("Please select the type of change being made."));
    };

    let mut ticket = find_project_ticket(&pool, &project, ticket_id).await?;

    let people: Vec<Uuid> = ticket
        .assigned_developer
        .into_iter()
        .chain(changes.assigned_developer)
        .collect();
    let summaries = get_summaries(&pool, &people).await?;
    let names = |id: Option<Uuid>| match id {
        Some(id) => summaries
            .get(&id)
            .map(|s| s.username.clone())
            .unwrap_or_else(|| id.to_string()),
        None => "Unassigned".to_string(),
    };

    let lines = apply_changes(&mut ticket, changes, names);
    if lines.is_empty() {
        return Ok(Json(ticket));
    }

    let entry = HistoryEntry::new(change_type, user.user_id, lines);
    db::save_ticket(&pool, &mut ticket, &entry).await?;

    tracing::info!("Ticket {} updated by {} ({})", ticket.id, user.username, change_type);
    Ok(Json(ticket))
}

/// PUT /api/tickets/comment/{ticket_id}
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(ticket_id): Path<Uuid>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let text = request.text()?;
    let comment = Comment::new(user.user_id, &user.name, text);

    let comments = db::COMMENTS
        .push(&pool, ticket_id, &comment)
        .await?
        .ok_or_else(|| BackendError::not_found(TICKET_NOT_FOUND_MESSAGE))?;

    Ok(Json(comments))
}

/// DELETE /api/tickets/{project_id}/{ticket_id}
///
/// The ticket is also removed from every sprint that references it.
pub async fn delete_ticket(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((project_id, ticket_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, BackendError> {
    let project = find_project(&pool, project_id).await?;
    if !user.can_manage(&project) {
        return Err(BackendError::not_permitted());
    }
    let ticket = find_project_ticket(&pool, &project, ticket_id).await?;

    let detached = db::delete_ticket(&pool, ticket.id)
        .await?
        .ok_or_else(|| BackendError::not_found(TICKET_NOT_FOUND_MESSAGE))?;

    tracing::info!(
        "Ticket {} deleted by {}, detached from {} sprint(s)",
        ticket.id,
        user.username,
        detached
    );
    Ok(Json(MessageResponse::new("This ticket has been deleted.")))
}
