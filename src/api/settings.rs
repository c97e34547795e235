//! Site settings endpoint (admin only)

use axum::{extract::State, routing::put, Json, Router};

use crate::db::SettingsRepository;
use crate::middleware::{AuthUser, ClientIp};
use crate::models::{actions, entities, AuditEvent, SiteSettings, UpdateSettingsRequest};
use crate::utils::validation::{validate_email, validate_hex_color};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", put(update))
}

async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Json(request): Json<UpdateSettingsRequest>,
) -> AppResult<Json<SiteSettings>> {
    if !auth_user.is_admin() {
        return Err(AppError::forbidden("administrator role required"));
    }
    validate_request(&request)?;

    let repo = SettingsRepository::new(&state.db);
    let existing = repo.get().await?;

    let mut updated = existing.clone();
    updated.apply(request);
    repo.save(&updated).await?;

    state.audit.record(AuditEvent::new(
        actions::UPDATE_SETTINGS,
        entities::SETTINGS,
        crate::models::SETTINGS_ROW_ID.to_string(),
        Some(serde_json::to_value(&existing)?),
        Some(serde_json::to_value(&updated)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(Json(updated))
}

fn validate_request(request: &UpdateSettingsRequest) -> AppResult<()> {
    if let Some(color) = request.primary_color.as_deref() {
        if !validate_hex_color(color) {
            return Err(AppError::ValidationError(
                "primary_color must be a hex color code".to_string(),
            ));
        }
    }
    for (field, value) in [
        ("entity_email", request.entity_email.as_deref()),
        ("ombudsman_email", request.ombudsman_email.as_deref()),
    ] {
        if let Some(email) = value {
            if !validate_email(email) {
                return Err(AppError::ValidationError(format!(
                    "{field} is not a valid e-mail address"
                )));
            }
        }
    }
    Ok(())
}
