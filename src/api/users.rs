//! User administration endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::db::UserRepository;
use crate::middleware::{AuthUser, ClientIp};
use crate::models::{
    actions, entities, AuditEvent, ChangePasswordRequest, CreateUserRequest, UpdateUserRequest,
    User, UserPublic, REDACTED_PLACEHOLDER,
};
use crate::services;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/status", patch(toggle_status))
        .route("/{id}/password", patch(change_password))
}

fn require_admin(auth_user: &AuthUser) -> AppResult<()> {
    if auth_user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("administrator role required"))
    }
}

async fn list(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<Vec<UserPublic>>> {
    require_admin(&auth_user)?;

    let users = UserRepository::new(&state.db).list().await?;
    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}

async fn get_one(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserPublic>> {
    require_admin(&auth_user)?;

    let user = find_user(&state, id).await?;
    Ok(Json(user.into()))
}

async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    require_admin(&auth_user)?;
    request.validate()?;

    let password_hash = services::auth::hash_password(&request.password)?;
    let user = User::new(
        request.name.trim().to_string(),
        request.email.trim().to_lowercase(),
        password_hash,
        request.role,
    );
    UserRepository::new(&state.db).insert(&user).await?;

    let public = UserPublic::from(user);
    state.audit.record(AuditEvent::new(
        actions::CREATE_USER,
        entities::USER,
        public.id.to_string(),
        None,
        Some(serde_json::to_value(&public)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok((StatusCode::CREATED, Json(public)))
}

async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<UserPublic>> {
    require_admin(&auth_user)?;
    request.validate()?;

    let repo = UserRepository::new(&state.db);
    let existing = find_user(&state, id).await?;

    repo.update_profile(
        id,
        request.name.trim(),
        &request.email.trim().to_lowercase(),
        &request.role,
    )
    .await?;
    let updated = find_user(&state, id).await?;

    let prior = UserPublic::from(existing);
    let current = UserPublic::from(updated);
    state.audit.record(AuditEvent::new(
        actions::UPDATE_USER,
        entities::USER,
        id.to_string(),
        Some(serde_json::to_value(&prior)?),
        Some(serde_json::to_value(&current)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(Json(current))
}

async fn toggle_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserPublic>> {
    require_admin(&auth_user)?;

    let repo = UserRepository::new(&state.db);
    let existing = find_user(&state, id).await?;

    repo.set_active(id, !existing.active).await?;
    let updated = find_user(&state, id).await?;

    let prior = UserPublic::from(existing);
    let current = UserPublic::from(updated);
    state.audit.record(AuditEvent::new(
        actions::TOGGLE_USER_STATUS,
        entities::USER,
        id.to_string(),
        Some(serde_json::to_value(&prior)?),
        Some(serde_json::to_value(&current)?),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(Json(current))
}

async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    require_admin(&auth_user)?;
    request.validate()?;

    let repo = UserRepository::new(&state.db);
    find_user(&state, id).await?;

    let password_hash = services::auth::hash_password(&request.password)?;
    repo.update_password(id, &password_hash).await?;

    // password material never reaches the audit trail
    let redacted = serde_json::Value::String(REDACTED_PLACEHOLDER.to_string());
    state.audit.record(AuditEvent::new(
        actions::CHANGE_USER_PASSWORD,
        entities::USER,
        id.to_string(),
        Some(redacted.clone()),
        Some(redacted),
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&auth_user)?;
    if auth_user.id == id {
        return Err(AppError::bad_request("cannot delete your own account"));
    }

    let existing = find_user(&state, id).await?;
    UserRepository::new(&state.db).delete(id).await?;

    let prior = UserPublic::from(existing);
    state.audit.record(AuditEvent::new(
        actions::DELETE_USER,
        entities::USER,
        id.to_string(),
        Some(serde_json::to_value(&prior)?),
        None,
        auth_user.request_context(client_ip.into_inner()),
    ));

    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, id: Uuid) -> AppResult<User> {
    UserRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))
}
