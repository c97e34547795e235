//! FAQ administration endpoints (admin only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::db::FaqRepository;
use crate::middleware::{AuthUser, ClientIp};
use crate::models::{actions, entities, AuditEvent, Faq, FaqQuery, FaqRequest, Page};
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
}

fn require_admin(auth_user: &AuthUser) -> AppResult<()> {
    if auth_user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("administrator role required"))
    }
}

async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<FaqQuery>,
) -> AppResult<Json<Page<Faq>>> {
    require_admin(&auth_user)?;

    let (items, total) = FaqRepository::new(&state.db).list(&query).await?;
    Ok(Json(Page::new(items, total, query.page, query.per_page)))
}

async fn get_one(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Faq>> {
    require_admin(&auth_user)?;

    let faq = find_faq(&state, id).await?;
    Ok(Json(faq))
}

async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Json(request): Json<FaqRequest>,
) -> AppResult<(StatusCode, Json<Faq>)> {
    require_admin(&auth_user)?;
    request.validate()?;

    let faq = FaqRepository::new(&state.db).insert(&request).await?;

    state.audit.record(AuditEvent::new(
        actions::CREATE_FAQ,
        entities::FAQ,
        faq.id.to_string(),
        None,
        Some(serde_json::to_value(&faq)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok((StatusCode::CREATED, Json(faq)))
}

async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<i64>,
    Json(request): Json<FaqRequest>,
) -> AppResult<Json<Faq>> {
    require_admin(&auth_user)?;
    request.validate()?;

    let repo = FaqRepository::new(&state.db);
    let existing = find_faq(&state, id).await?;

    repo.update(id, &request).await?;
    let updated = find_faq(&state, id).await?;

    state.audit.record(AuditEvent::new(
        actions::UPDATE_FAQ,
        entities::FAQ,
        id.to_string(),
        Some(serde_json::to_value(&existing)?),
        Some(serde_json::to_value(&updated)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    require_admin(&auth_user)?;

    let existing = find_faq(&state, id).await?;
    FaqRepository::new(&state.db).delete(id).await?;

    state.audit.record(AuditEvent::new(
        actions::DELETE_FAQ,
        entities::FAQ,
        id.to_string(),
        Some(serde_json::to_value(&existing)?),
        None,
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(StatusCode::NO_CONTENT)
}

async fn find_faq(state: &AppState, id: i64) -> AppResult<Faq> {
    FaqRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("FAQ entry not found"))
}
