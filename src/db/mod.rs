//! Database layer
//!
//! SQLite storage for revenue and expense records, users, FAQ content,
//! the site-settings singleton and the audit trail. Monetary values are
//! stored as TEXT decimals so they round-trip exactly.

pub mod audit_repository;
pub mod expense_repository;
pub mod faq_repository;
pub mod revenue_repository;
pub mod settings_repository;
pub mod user_repository;

pub use audit_repository::AuditRepository;
pub use expense_repository::ExpenseRepository;
pub use faq_repository::FaqRepository;
pub use revenue_repository::RevenueRepository;
pub use settings_repository::SettingsRepository;
pub use user_repository::UserRepository;

use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}
