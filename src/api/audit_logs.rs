//! Audit log query endpoint (admin only, read-only)

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::db::AuditRepository;
use crate::middleware::AuthUser;
use crate::models::{AuditLogEntry, AuditLogQuery, Page};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list))
}

async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> AppResult<Json<Page<AuditLogEntry>>> {
    if !auth_user.is_admin() {
        return Err(AppError::forbidden("administrator role required"));
    }

    let (items, total) = AuditRepository::new(&state.db).list(&query).await?;
    Ok(Json(Page::new(items, total, query.page, query.per_page)))
}
