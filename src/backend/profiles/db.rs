/**
 * Profile Database Operations
 *
 * One profile per user (`user_id` is unique). Reads join `users` so each
 * profile comes back with its user summary populated.
 */

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::store::{self, Element, EmbeddedList};
use crate::shared::{Profile, ProfileView, UserSummary};

/// `profiles.comments`, addressed by the profile's user
pub const COMMENTS: EmbeddedList = EmbeddedList {
    table: "profiles",
    column: "comments",
    owner: "user_id",
    element: Element::Field("id"),
};

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.bio, p.skills, p.comments, p.created_at, p.updated_at,
           u.username, u.first_name, u.last_name
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

fn profile_from_row(row: &SqliteRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: store::id(row, "id")?,
        user: store::id(row, "user_id")?,
        bio: row.try_get("bio")?,
        skills: store::document(row, "skills")?,
        comments: store::document(row, "comments")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn view_from_row(row: &SqliteRow) -> Result<ProfileView, sqlx::Error> {
    let profile = profile_from_row(row)?;
    let user = UserSummary {
        id: profile.user,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    };
    Ok(ProfileView::new(profile, user))
}

/// All profiles with their users, by username
pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<ProfileView>, sqlx::Error> {
    let sql = format!("{VIEW_SELECT} ORDER BY u.username");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(view_from_row).collect()
}

pub async fn get_profile_view(pool: &SqlitePool, user_id: Uuid) -> Result<Option<ProfileView>, sqlx::Error> {
    let sql = format!("{VIEW_SELECT} WHERE p.user_id = ?");
    sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?
        .map(|row| view_from_row(&row))
        .transpose()
}

pub async fn get_profile(pool: &SqlitePool, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query(
        "SELECT id, user_id, bio, skills, comments, created_at, updated_at FROM profiles WHERE user_id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?
    .map(|row| profile_from_row(&row))
    .transpose()
}

/// Insert the profile, or overwrite the bio and skills of the one the user
/// already has; existing comments are kept
pub async fn upsert_profile(pool: &SqlitePool, profile: &mut Profile) -> Result<(), sqlx::Error> {
    profile.updated_at = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, bio, skills, comments, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            bio = excluded.bio,
            skills = excluded.skills,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(profile.id.to_string())
    .bind(profile.user.to_string())
    .bind(&profile.bio)
    .bind(Json(&profile.skills))
    .bind(Json(&profile.comments))
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_profile(pool: &SqlitePool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
