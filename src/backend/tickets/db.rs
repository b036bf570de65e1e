/**
 * Ticket Database Operations
 *
 * Tickets keep their change history and comments as embedded JSON arrays,
 * appended through [`HISTORY`] and [`COMMENTS`]. Deleting a ticket also
 * removes its id from every sprint's `tickets` list, in the same transaction.
 */

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::backend::sprints;
use crate::backend::store::{self, Element, EmbeddedList};
use crate::shared::{HistoryEntry, Ticket};

pub const HISTORY: EmbeddedList = EmbeddedList {
    table: "tickets",
    column: "history",
    owner: "id",
    element: Element::Field("id"),
};

pub const COMMENTS: EmbeddedList = EmbeddedList {
    table: "tickets",
    column: "comments",
    owner: "id",
    element: Element::Field("id"),
};

const TICKET_COLUMNS: &str = "id, project_id, title, ticket_type, description, priority, status, \
     assigned_developer, resolution_summary, date_due, date_completed, history, comments, \
     created_by, created_at, updated_at";

fn ticket_from_row(row: &SqliteRow) -> Result<Ticket, sqlx::Error> {
    Ok(Ticket {
        id: store::id(row, "id")?,
        project: store::id(row, "project_id")?,
        title: row.try_get("title")?,
        ticket_type: store::parsed(row, "ticket_type")?,
        description: row.try_get("description")?,
        priority: store::parsed(row, "priority")?,
        status: store::parsed(row, "status")?,
        assigned_developer: store::optional_id(row, "assigned_developer")?,
        resolution_summary: row.try_get("resolution_summary")?,
        date_due: row.try_get("date_due")?,
        date_completed: row.try_get("date_completed")?,
        history: store::document(row, "history")?,
        comments: store::document(row, "comments")?,
        created_by: store::id(row, "created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert_ticket(pool: &SqlitePool, ticket: &Ticket) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tickets (id, project_id, title, ticket_type, description, priority, status,
                             assigned_developer, resolution_summary, date_due, date_completed,
                             history, comments, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(ticket.id.to_string())
    .bind(ticket.project.to_string())
    .bind(&ticket.title)
    .bind(ticket.ticket_type.as_str())
    .bind(&ticket.description)
    .bind(ticket.priority.as_str())
    .bind(ticket.status.as_str())
    .bind(ticket.assigned_developer.map(|id| id.to_string()))
    .bind(&ticket.resolution_summary)
    .bind(ticket.date_due)
    .bind(ticket.date_completed)
    .bind(Json(&ticket.history))
    .bind(Json(&ticket.comments))
    .bind(ticket.created_by.to_string())
    .bind(ticket.created_at)
    .bind(ticket.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_ticket(pool: &SqlitePool, ticket_id: Uuid) -> Result<Option<Ticket>, sqlx::Error> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?");
    sqlx::query(&sql)
        .bind(ticket_id.to_string())
        .fetch_optional(pool)
        .await?
        .map(|row| ticket_from_row(&row))
        .transpose()
}

/// Tickets of a project, oldest first
pub async fn tickets_for_project(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<Ticket>, sqlx::Error> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE project_id = ? ORDER BY created_at");
    let rows = sqlx::query(&sql)
        .bind(project_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(ticket_from_row).collect()
}

/// Tickets assigned to a user, across projects
pub async fn tickets_assigned_to(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Ticket>, sqlx::Error> {
    let sql = format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE assigned_developer = ? ORDER BY created_at"
    );
    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(ticket_from_row).collect()
}

/// Load tickets by id, in the order given; missing ids are skipped
pub async fn tickets_by_ids(pool: &SqlitePool, ticket_ids: &[Uuid]) -> Result<Vec<Ticket>, sqlx::Error> {
    let mut tickets = Vec::with_capacity(ticket_ids.len());
    for id in ticket_ids {
        if let Some(ticket) = get_ticket(pool, *id).await? {
            tickets.push(ticket);
        }
    }
    Ok(tickets)
}

/// Write back the scalar fields and append `entry` to the history, in one
/// transaction
///
/// On success `ticket.history` holds the stored history, including entries
/// other writers appended since the ticket was read.
pub async fn save_ticket(
    pool: &SqlitePool,
    ticket: &mut Ticket,
    entry: &HistoryEntry,
) -> Result<(), sqlx::Error> {
    ticket.updated_at = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE tickets
        SET title = ?, ticket_type = ?, description = ?, priority = ?, status = ?,
            assigned_developer = ?, resolution_summary = ?, date_due = ?, date_completed = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&ticket.title)
    .bind(ticket.ticket_type.as_str())
    .bind(&ticket.description)
    .bind(ticket.priority.as_str())
    .bind(ticket.status.as_str())
    .bind(ticket.assigned_developer.map(|id| id.to_string()))
    .bind(&ticket.resolution_summary)
    .bind(ticket.date_due)
    .bind(ticket.date_completed)
    .bind(ticket.updated_at)
    .bind(ticket.id.to_string())
    .execute(&mut *tx)
    .await?;

    if let Some(history) = HISTORY.push(&mut *tx, ticket.id, entry).await? {
        ticket.history = history;
    }

    tx.commit().await?;
    Ok(())
}

/// Clear the assignee of every ticket assigned to `user_id`, optionally
/// only within one project; returns the number of tickets changed
pub async fn unassign_developer<'e, E>(
    executor: E,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE tickets SET assigned_developer = NULL, updated_at = ?1
        WHERE assigned_developer = ?2 AND (?3 IS NULL OR project_id = ?3)
        "#,
    )
    .bind(Utc::now())
    .bind(user_id.to_string())
    .bind(project_id.map(|id| id.to_string()))
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a ticket and detach it from every sprint
///
/// Returns the number of sprints the ticket was removed from, or `None` if
/// the ticket did not exist.
pub async fn delete_ticket(pool: &SqlitePool, ticket_id: Uuid) -> Result<Option<u64>, sqlx::Error> {
    let id = ticket_id.to_string();
    let mut tx = pool.begin().await?;

    let detached = sprints::db::TICKETS
        .remove_from_all(&mut *tx, ticket_id, None)
        .await?;

    let deleted = sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;
    Ok(Some(detached))
}
