//! Transparency portal backend library
//!
//! Budget revenue and expense publication for a government entity:
//! CSV bulk import with batch rollback, audited administration and the
//! public consultation API.

pub mod api;
pub mod config;
pub mod db;
pub mod import;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};
use services::AuditRecorder;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Handle to the background audit writer
    pub audit: AuditRecorder,
}
