//! User repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    active: i64,
    created_at: String,
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.active as i64)
        .bind(user.created_at.to_rfc3339())
        .execute(self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, active, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, active, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch user by e-mail")?;

        Ok(row.map(row_to_user))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, active, created_at FROM users ORDER BY name",
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list users")?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .context("Failed to count users")?;

        Ok(count)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        role: &str,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ?, role = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(role)
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to update user")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to update user password")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET active = ? WHERE id = ?")
            .bind(active as i64)
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to update user status")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}

fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        name: row.name,
        email: row.email,
        password_hash: row.password_hash,
        role: row.role,
        active: row.active != 0,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
