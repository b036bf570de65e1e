/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::store;
use crate::backend::{projects, sprints, tickets};
use crate::shared::{Role, UserSummary};

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, email, password_hash, role, created_at, updated_at";

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// User email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    /// Name stamped on comments
    pub fn display_name(&self) -> String {
        self.summary().display_name()
    }
}

/// Fields for a new user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: store::id(row, "id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: store::parsed(row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Create a new user
///
/// # Returns
/// Created user or error (a duplicate username or email is a unique violation)
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: new_user.username,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        role: new_user.role,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, username, first_name, last_name, email, password_hash, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?
        .map(|row| user_from_row(&row))
        .transpose()
}

/// Get user by email (case-insensitive)
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower(?)");
    sqlx::query(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?
        .map(|row| user_from_row(&row))
        .transpose()
}

/// Get user by username (case-insensitive)
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower(?)");
    sqlx::query(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .map(|row| user_from_row(&row))
        .transpose()
}

/// All users, oldest first
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, username");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(user_from_row).collect()
}

/// Result of a role change
#[derive(Debug)]
pub enum RoleChange {
    Updated(User),
    /// The user would have been the last admin to lose the role
    LastAdmin,
    Missing,
}

/// Change a user's role
///
/// The check that another admin remains and the update are one statement,
/// so two admins demoting each other cannot both succeed.
pub async fn update_role(
    pool: &SqlitePool,
    user_id: Uuid,
    role: Role,
) -> Result<RoleChange, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET role = ?1, updated_at = ?2
        WHERE id = ?3
          AND (role != 'admin' OR ?1 = 'admin'
               OR (SELECT COUNT(*) FROM users WHERE role = 'admin') > 1)
        "#,
    )
    .bind(role.as_str())
    .bind(Utc::now())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    match get_user_by_id(pool, user_id).await? {
        None => Ok(RoleChange::Missing),
        Some(_) if result.rows_affected() == 0 => Ok(RoleChange::LastAdmin),
        Some(user) => Ok(RoleChange::Updated(user)),
    }
}

/// Result of deleting an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountDeletion {
    Deleted,
    /// The user still manages at least one project
    StillManaging,
    /// The user is the only admin
    LastAdmin,
    Missing,
}

/// Delete a user with their profile, in one transaction
///
/// The user is taken off every project's developer list and every sprint,
/// and their tickets are unassigned. Nothing changes if they still manage a
/// project or are the only admin.
pub async fn delete_account(pool: &SqlitePool, user_id: Uuid) -> Result<AccountDeletion, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Write first so the transaction holds the write lock before the checks
    projects::db::DEVELOPERS
        .remove_from_all(&mut *tx, user_id, None)
        .await?;

    let row = sqlx::query(
        "SELECT role, (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins FROM users WHERE id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(&mut *tx)
    .await?;
    let outcome = match row {
        None => Some(AccountDeletion::Missing),
        Some(row) => {
            let role: Role = store::parsed(&row, "role")?;
            let admins: i64 = row.try_get("admins")?;
            if role == Role::Admin && admins <= 1 {
                Some(AccountDeletion::LastAdmin)
            } else if projects::db::count_managed_by(&mut *tx, user_id).await? > 0 {
                Some(AccountDeletion::StillManaging)
            } else {
                None
            }
        }
    };
    if let Some(refused) = outcome {
        tx.rollback().await?;
        return Ok(refused);
    }

    tickets::db::unassign_developer(&mut *tx, user_id, None).await?;
    sprints::db::DEVELOPERS
        .remove_from_all(&mut *tx, user_id, None)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(AccountDeletion::Deleted)
}

/// Summaries for a set of users, keyed by id; unknown ids are skipped
pub async fn get_summaries(
    pool: &SqlitePool,
    user_ids: &[Uuid],
) -> Result<HashMap<Uuid, UserSummary>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT id, username, first_name, last_name FROM users WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query(&sql);
    for id in user_ids {
        query = query.bind(id.to_string());
    }

    let mut summaries = HashMap::with_capacity(user_ids.len());
    for row in query.fetch_all(pool).await? {
        let summary = UserSummary {
            id: store::id(&row, "id")?,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        };
        summaries.insert(summary.id, summary);
    }
    Ok(summaries)
}
