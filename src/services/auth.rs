//! Authentication service
//!
//! Argon2id password hashing, credential checks and first-run admin
//! seeding.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::info;

use crate::config::AuthConfig;
use crate::db::{DbPool, UserRepository};
use crate::models::User;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(password_hash)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Authenticate by e-mail and password. Unknown e-mail, wrong password and
/// deactivated accounts all resolve to `None`.
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> Result<Option<User>> {
    let user = UserRepository::new(pool).find_by_email(email).await?;

    match user {
        Some(user) if user.active => {
            if verify_password(password, &user.password_hash)? {
                Ok(Some(user))
            } else {
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

/// Seed the configured bootstrap administrator when the users table is
/// empty, so a fresh deployment can be logged into.
pub async fn ensure_bootstrap_admin(pool: &DbPool, config: &AuthConfig) -> Result<()> {
    let repo = UserRepository::new(pool);
    if repo.count().await? > 0 {
        return Ok(());
    }

    let password_hash =
        hash_password(&config.bootstrap_admin_password).context("Failed to hash admin password")?;
    let admin = User::new(
        "Administrador".to_string(),
        config.bootstrap_admin_email.clone(),
        password_hash,
        "ADMIN".to_string(),
    );
    repo.insert(&admin).await?;
    info!(email = %admin.email, "seeded bootstrap administrator");

    Ok(())
}
