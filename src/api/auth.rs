//! Authentication endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::db::UserRepository;
use crate::middleware::auth::{
    create_access_token, create_refresh_token, validate_token, TokenType,
};
use crate::middleware::AuthUser;
use crate::models::{AuthResponse, LoginRequest, RefreshTokenRequest, UserPublic};
use crate::services;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = services::auth::authenticate(&state.db, &request.email, &request.password)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    build_auth_response(&state, user).map(Json)
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_data = validate_token(&request.refresh_token, &state.config.auth.jwt_secret)
        .map_err(|_| AppError::unauthorized("invalid refresh token"))?;
    if token_data.claims.token_type != TokenType::Refresh {
        return Err(AppError::unauthorized("invalid token type"));
    }

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::unauthorized("invalid refresh token"))?;
    let user = UserRepository::new(&state.db)
        .find_by_id(user_id)
        .await?
        .filter(|u| u.active)
        .ok_or_else(|| AppError::unauthorized("invalid refresh token"))?;

    build_auth_response(&state, user).map(Json)
}

async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<UserPublic>> {
    let user = UserRepository::new(&state.db)
        .find_by_id(auth_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(user.into()))
}

fn build_auth_response(state: &AppState, user: crate::models::User) -> AppResult<AuthResponse> {
    let auth = &state.config.auth;
    let access_token = create_access_token(&user, &auth.jwt_secret, auth.access_token_expiry_minutes)
        .map_err(|e| AppError::internal(format!("failed to issue access token: {e}")))?;
    let refresh_token = create_refresh_token(&user, &auth.jwt_secret, auth.refresh_token_expiry_days)
        .map_err(|e| AppError::internal(format!("failed to issue refresh token: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth.access_token_expiry_minutes * 60,
        user: user.into(),
    })
}
