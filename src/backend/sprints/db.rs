/**
 * Sprint Database Operations
 */

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::store::{self, Element, EmbeddedList};
use crate::shared::Sprint;

/// `sprints.developers`, a list of user ids
pub const DEVELOPERS: EmbeddedList = EmbeddedList {
    table: "sprints",
    column: "developers",
    owner: "id",
    element: Element::Id,
};

/// `sprints.tickets`, a list of ticket ids
pub const TICKETS: EmbeddedList = EmbeddedList {
    table: "sprints",
    column: "tickets",
    owner: "id",
    element: Element::Id,
};

pub const COMMENTS: EmbeddedList = EmbeddedList {
    table: "sprints",
    column: "comments",
    owner: "id",
    element: Element::Field("id"),
};

const SPRINT_COLUMNS: &str = "id, project_id, title, description, date_start, date_end, \
     developers, tickets, comments, created_at, updated_at";

fn sprint_from_row(row: &SqliteRow) -> Result<Sprint, sqlx::Error> {
    Ok(Sprint {
        id: store::id(row, "id")?,
        project: store::id(row, "project_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date_start: row.try_get("date_start")?,
        date_end: row.try_get("date_end")?,
        developers: store::document(row, "developers")?,
        tickets: store::document(row, "tickets")?,
        comments: store::document(row, "comments")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert_sprint(pool: &SqlitePool, sprint: &Sprint) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sprints (id, project_id, title, description, date_start, date_end,
                             developers, tickets, comments, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(sprint.id.to_string())
    .bind(sprint.project.to_string())
    .bind(&sprint.title)
    .bind(&sprint.description)
    .bind(sprint.date_start)
    .bind(sprint.date_end)
    .bind(Json(&sprint.developers))
    .bind(Json(&sprint.tickets))
    .bind(Json(&sprint.comments))
    .bind(sprint.created_at)
    .bind(sprint.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_sprint(pool: &SqlitePool, sprint_id: Uuid) -> Result<Option<Sprint>, sqlx::Error> {
    let sql = format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE id = ?");
    sqlx::query(&sql)
        .bind(sprint_id.to_string())
        .fetch_optional(pool)
        .await?
        .map(|row| sprint_from_row(&row))
        .transpose()
}

/// Sprints of a project, by start date
pub async fn sprints_for_project(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<Sprint>, sqlx::Error> {
    let sql = format!(
        "SELECT {SPRINT_COLUMNS} FROM sprints WHERE project_id = ? ORDER BY date_start, created_at"
    );
    let rows = sqlx::query(&sql)
        .bind(project_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(sprint_from_row).collect()
}

/// Write back the scalar fields and bump `updated_at`
///
/// With `replace_developers` the developer list is overwritten as well;
/// `tickets` and `comments` only change through [`TICKETS`] and [`COMMENTS`].
pub async fn save_sprint(
    pool: &SqlitePool,
    sprint: &mut Sprint,
    replace_developers: bool,
) -> Result<(), sqlx::Error> {
    sprint.updated_at = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE sprints
        SET title = ?, description = ?, date_start = ?, date_end = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&sprint.title)
    .bind(&sprint.description)
    .bind(sprint.date_start)
    .bind(sprint.date_end)
    .bind(sprint.updated_at)
    .bind(sprint.id.to_string())
    .execute(&mut *tx)
    .await?;

    if replace_developers {
        DEVELOPERS.replace(&mut *tx, sprint.id, &sprint.developers).await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_sprint(pool: &SqlitePool, sprint_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sprints WHERE id = ?")
        .bind(sprint_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
