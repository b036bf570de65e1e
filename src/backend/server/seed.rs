/**
 * Bootstrap Admin
 *
 * Signup never hands out the admin role, so the first admin comes from the
 * optional `[admin]` config section. The account is created at startup when
 * no user with that email exists; an existing account is left untouched.
 */

use bcrypt::hash;
use sqlx::SqlitePool;

use crate::backend::auth::users::{create_user, get_user_by_email, User, NewUser};
use crate::backend::error::BackendError;
use crate::shared::config::AdminSeed;
use crate::shared::Role;

/// Create the configured admin if missing; returns the new user when created
pub async fn seed_admin(
    pool: &SqlitePool,
    seed: &AdminSeed,
    bcrypt_cost: u32,
) -> Result<Option<User>, BackendError> {
    if get_user_by_email(pool, &seed.email).await?.is_some() {
        tracing::debug!("Admin account {} already present", seed.email);
        return Ok(None);
    }

    let password_hash = hash(&seed.password, bcrypt_cost)?;
    let user = create_user(
        pool,
        NewUser {
            username: seed.username.clone(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: seed.email.clone(),
            password_hash,
            role: Role::Admin,
        },
    )
    .await?;

    tracing::info!("Seeded admin account {} ({})", user.username, user.email);
    Ok(Some(user))
}
