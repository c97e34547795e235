//! Audit trail models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User name recorded when no authenticated principal is present
pub const SYSTEM_USER_NAME: &str = "SISTEMA";

/// Placeholder stored instead of password material in audit payloads
pub const REDACTED_PLACEHOLDER: &str = "[OCULTO POR SEGURANÇA]";

/// Audit action tags
pub mod actions {
    pub const IMPORT_BATCH_CSV: &str = "IMPORT_BATCH_CSV";
    pub const DELETE_BATCH_REVENUE: &str = "DELETE_BATCH_REVENUE";
    pub const CREATE_REVENUE: &str = "CREATE_REVENUE";
    pub const UPDATE_REVENUE: &str = "UPDATE_REVENUE";
    pub const DELETE_REVENUE: &str = "DELETE_REVENUE";
    pub const CREATE_USER: &str = "CREATE_USER";
    pub const UPDATE_USER: &str = "UPDATE_USER";
    pub const TOGGLE_USER_STATUS: &str = "TOGGLE_USER_STATUS";
    pub const CHANGE_USER_PASSWORD: &str = "CHANGE_USER_PASSWORD";
    pub const DELETE_USER: &str = "DELETE_USER";
    pub const CREATE_FAQ: &str = "CREATE_FAQ";
    pub const UPDATE_FAQ: &str = "UPDATE_FAQ";
    pub const DELETE_FAQ: &str = "DELETE_FAQ";
    pub const UPDATE_SETTINGS: &str = "UPDATE_SETTINGS";
}

/// Audited entity type tags
pub mod entities {
    pub const REVENUE: &str = "REVENUE";
    pub const USER: &str = "USER";
    pub const FAQ: &str = "FAQ";
    pub const SETTINGS: &str = "SETTINGS";
}

/// The acting principal and origin of a request, captured at the HTTP
/// boundary and threaded explicitly through service calls.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub origin_ip: Option<String>,
}

impl RequestContext {
    /// Context for operations with no authenticated principal
    pub fn system() -> Self {
        Self::default()
    }
}

/// Transient message handed from a mutating operation to the audit writer
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub prior_state: Option<serde_json::Value>,
    pub new_state: Option<serde_json::Value>,
    pub context: RequestContext,
}

impl AuditEvent {
    pub fn new(
        action: &str,
        entity_type: &str,
        entity_id: impl Into<String>,
        prior_state: Option<serde_json::Value>,
        new_state: Option<serde_json::Value>,
        context: RequestContext,
    ) -> Self {
        Self {
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id.into()),
            prior_state,
            new_state,
            context,
        }
    }
}

/// One immutable, append-only audit log row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    /// Serialized JSON snapshot before the change; null when not applicable
    pub prior_state: Option<String>,
    /// Serialized JSON snapshot after the change; null when not applicable
    pub new_state: Option<String>,
    pub origin_ip: String,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for the audit log listing; all filters are
/// case-insensitive substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub entity: Option<String>,
    pub user: Option<String>,
    #[serde(default = "crate::models::default_page")]
    pub page: u32,
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: u32,
}
