/**
 * Project Database Operations
 *
 * One row per project. `developers` and `comments` are JSON arrays; membership
 * queries look inside `developers` with `json_each`. Both lists change only
 * through [`DEVELOPERS`] and [`COMMENTS`], never by rewriting the row.
 */

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::backend::store::{self, Element, EmbeddedList};
use crate::backend::{sprints, tickets};
use crate::shared::{Project, ProjectDeveloper};

/// `projects.developers`, entries identified by `user`
pub const DEVELOPERS: EmbeddedList = EmbeddedList {
    table: "projects",
    column: "developers",
    owner: "id",
    element: Element::Field("user"),
};

/// `projects.comments`
pub const COMMENTS: EmbeddedList = EmbeddedList {
    table: "projects",
    column: "comments",
    owner: "id",
    element: Element::Field("id"),
};

const PROJECT_COLUMNS: &str = "id, creator, name, description, target_completion_date, \
     completion_date, manager, developers, comments, created_at, updated_at";

fn project_from_row(row: &SqliteRow) -> Result<Project, sqlx::Error> {
    Ok(Project {
        id: store::id(row, "id")?,
        creator: store::id(row, "creator")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        target_completion_date: row.try_get("target_completion_date")?,
        completion_date: row.try_get("completion_date")?,
        manager: store::id(row, "manager")?,
        developers: store::document(row, "developers")?,
        comments: store::document(row, "comments")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new project; a taken name is a unique violation
pub async fn insert_project(pool: &SqlitePool, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO projects (id, creator, name, description, target_completion_date,
                              completion_date, manager, developers, comments, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(project.id.to_string())
    .bind(project.creator.to_string())
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.target_completion_date)
    .bind(project.completion_date)
    .bind(project.manager.to_string())
    .bind(Json(&project.developers))
    .bind(Json(&project.comments))
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_project(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?");
    sqlx::query(&sql)
        .bind(project_id.to_string())
        .fetch_optional(pool)
        .await?
        .map(|row| project_from_row(&row))
        .transpose()
}

/// Projects the user manages or is listed on as a developer
pub async fn projects_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {PROJECT_COLUMNS} FROM projects
        WHERE manager = ?1
           OR EXISTS (SELECT 1 FROM json_each(projects.developers)
                      WHERE json_extract(json_each.value, '$.user') = ?1)
        ORDER BY created_at
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(project_from_row).collect()
}

/// Whether another project already uses `name`
pub async fn name_taken(
    pool: &SqlitePool,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM projects WHERE name = ? AND id != ?")
        .bind(name)
        .bind(exclude.map(|id| id.to_string()).unwrap_or_default())
        .fetch_one(pool)
        .await?;
    Ok(row.try_get::<i64, _>("n")? > 0)
}

/// Number of projects the user manages
pub async fn count_managed_by<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT COUNT(*) AS n FROM projects WHERE manager = ?")
        .bind(user_id.to_string())
        .fetch_one(executor)
        .await?;
    row.try_get("n")
}

/// Write back the scalar fields and bump `updated_at`
///
/// The embedded lists are left alone; they change through [`DEVELOPERS`] and
/// [`COMMENTS`].
pub async fn save_project(pool: &SqlitePool, project: &mut Project) -> Result<(), sqlx::Error> {
    project.updated_at = Utc::now();
    sqlx::query(
        r#"
        UPDATE projects
        SET name = ?, description = ?, target_completion_date = ?, completion_date = ?,
            manager = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.target_completion_date)
    .bind(project.completion_date)
    .bind(project.manager.to_string())
    .bind(project.updated_at)
    .bind(project.id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Take a developer off a project, with their ticket assignments and sprint
/// places in it, in one transaction
///
/// Returns the remaining developers, or `None` if the user was not listed.
/// A manager who was also listed keeps their assignments.
pub async fn remove_developer(
    pool: &SqlitePool,
    project: &Project,
    user_id: Uuid,
) -> Result<Option<Vec<ProjectDeveloper>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(developers) = DEVELOPERS.remove(&mut *tx, project.id, user_id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    if !project.is_manager(user_id) {
        let unassigned = tickets::db::unassign_developer(&mut *tx, user_id, Some(project.id)).await?;
        let sprints = sprints::db::DEVELOPERS
            .remove_from_all(&mut *tx, user_id, Some(("project_id", project.id)))
            .await?;
        tracing::debug!(
            "Developer {} left project {}: {} tickets unassigned, {} sprints updated",
            user_id,
            project.id,
            unassigned,
            sprints
        );
    }

    tx.commit().await?;
    Ok(Some(developers))
}

/// Delete a project together with its sprints and tickets
pub async fn delete_project(pool: &SqlitePool, project_id: Uuid) -> Result<bool, sqlx::Error> {
    let id = project_id.to_string();
    let mut tx = pool.begin().await?;

    let tickets = sqlx::query("DELETE FROM tickets WHERE project_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    let sprints = sqlx::query("DELETE FROM sprints WHERE project_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    let project = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        "Deleted project {} with {} sprints and {} tickets",
        project_id,
        sprints.rows_affected(),
        tickets.rows_affected()
    );
    Ok(project.rows_affected() > 0)
}
