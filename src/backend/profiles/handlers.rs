/**
 * Profile Handlers
 *
 * HTTP handlers for `/api/profiles`. Profiles let members find developers
 * by name or skill before adding them to a project.
 */

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::MessageResponse;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::profiles::db;
use crate::backend::validation::{CommentRequest, JsonBody};
use crate::shared::{Comment, Profile, ProfileView};

pub const PROFILE_NOT_FOUND_MESSAGE: &str = "There is no profile for this user.";

/// `skills` may be sent as a list or as one comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Skills {
    List(Vec<String>),
    Text(String),
}

impl Skills {
    /// Trimmed, non-empty skills without duplicates (case-insensitive)
    pub fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Skills::List(list) => list,
            Skills::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        let mut skills: Vec<String> = Vec::with_capacity(raw.len());
        for skill in raw {
            let skill = skill.trim();
            if !skill.is_empty() && !skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                skills.push(skill.to_string());
            }
        }
        skills
    }
}

/// Body of `POST /api/profiles`; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub bio: Option<String>,
    pub skills: Option<Skills>,
}

/// Query of `GET /api/profiles`
#[derive(Debug, Default, Deserialize)]
pub struct ProfileSearch {
    pub search: Option<String>,
}

async fn find_view(pool: &SqlitePool, user_id: Uuid) -> Result<ProfileView, BackendError> {
    db::get_profile_view(pool, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found(PROFILE_NOT_FOUND_MESSAGE))
}

/// GET /api/profiles?search=
pub async fn list_profiles(
    State(pool): State<SqlitePool>,
    Query(query): Query<ProfileSearch>,
) -> Result<Json<Vec<ProfileView>>, BackendError> {
    let mut profiles = db::list_profiles(&pool).await?;
    if let Some(term) = query.search.as_deref() {
        profiles.retain(|p| p.matches(term));
    }
    Ok(Json(profiles))
}

/// GET /api/profiles/me
pub async fn get_my_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileView>, BackendError> {
    Ok(Json(find_view(&pool, user.user_id).await?))
}

/// GET /api/profiles/user/{user_id}
pub async fn get_user_profile(
    State(pool): State<SqlitePool>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileView>, BackendError> {
    Ok(Json(find_view(&pool, user_id).await?))
}

/// POST /api/profiles
///
/// Creates the caller's profile, or updates it if one exists.
pub async fn upsert_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<ProfileRequest>,
) -> Result<Json<ProfileView>, BackendError> {
    let existing = db::get_profile(&pool, user.user_id).await?;
    let created = existing.is_none();

    let mut profile = existing.unwrap_or_else(|| {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            user: user.user_id,
            bio: String::new(),
            skills: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    });
    if let Some(bio) = request.bio {
        profile.bio = bio.trim().to_string();
    }
    if let Some(skills) = request.skills {
        profile.skills = skills.normalize();
    }

    db::upsert_profile(&pool, &mut profile).await?;
    tracing::info!(
        "Profile {} for {}",
        if created { "created" } else { "updated" },
        user.username
    );

    Ok(Json(find_view(&pool, user.user_id).await?))
}

/// PUT /api/profiles/comment/{user_id}
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<Uuid>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<Json<Vec<Comment>>, BackendError> {
    let text = request.text()?;
    let comment = Comment::new(user.user_id, &user.name, text);

    let comments = db::COMMENTS
        .push(&pool, user_id, &comment)
        .await?
        .ok_or_else(|| BackendError::not_found(PROFILE_NOT_FOUND_MESSAGE))?;

    Ok(Json(comments))
}

/// DELETE /api/profiles
pub async fn delete_my_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>, BackendError> {
    if !db::delete_profile(&pool, user.user_id).await? {
        return Err(BackendError::not_found(PROFILE_NOT_FOUND_MESSAGE));
    }
    tracing::info!("Profile deleted by {}", user.username);
    Ok(Json(MessageResponse::new("Profile deleted")))
}

/// DELETE /api/profiles/user/{user_id}
///
/// The profile's owner or an admin.
pub async fn delete_user_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, BackendError> {
    if user.user_id != user_id && !user.is_admin() {
        return Err(BackendError::not_permitted());
    }
    if !db::delete_profile(&pool, user_id).await? {
        return Err(BackendError::not_found(PROFILE_NOT_FOUND_MESSAGE));
    }
    tracing::info!("Profile of {} deleted by {}", user_id, user.username);
    Ok(Json(MessageResponse::new("Profile deleted")))
}
