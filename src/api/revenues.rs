//! Revenue administration endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::db::RevenueRepository;
use crate::middleware::{AuthUser, ClientIp};
use crate::models::{
    ImportOutcome, Page, Revenue, RevenueQuery, RevenueRequest, RevenueTotal, RollbackOutcome,
};
use crate::services::RevenueService;
use crate::utils::{AppError, AppResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/years", get(years))
        .route("/total", get(total))
        .route("/import", post(import))
        .route("/batches/{batch_id}", delete(rollback_batch))
        .route("/{id}", get(get_one).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<Page<Revenue>>> {
    let page = RevenueService::new(&state.db, &state.audit)
        .list(&query)
        .await?;
    Ok(Json(page))
}

async fn years(State(state): State<AppState>) -> AppResult<Json<Vec<i32>>> {
    let years = RevenueRepository::new(&state.db).distinct_years().await?;
    Ok(Json(years))
}

#[derive(Debug, Deserialize)]
struct TotalParams {
    year: i32,
}

async fn total(
    State(state): State<AppState>,
    Query(params): Query<TotalParams>,
) -> AppResult<Json<RevenueTotal>> {
    let total = RevenueService::new(&state.db, &state.audit)
        .total_for_year(params.year)
        .await?;
    Ok(Json(total))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Revenue>> {
    let revenue = RevenueService::new(&state.db, &state.audit).get(id).await?;
    Ok(Json(revenue))
}

async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Json(request): Json<RevenueRequest>,
) -> AppResult<(StatusCode, Json<Revenue>)> {
    request.validate()?;
    let context = auth_user.request_context(client_ip.into_inner());

    let revenue = RevenueService::new(&state.db, &state.audit)
        .create(request, context)
        .await?;
    Ok((StatusCode::CREATED, Json(revenue)))
}

async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<i64>,
    Json(request): Json<RevenueRequest>,
) -> AppResult<Json<Revenue>> {
    request.validate()?;
    let context = auth_user.request_context(client_ip.into_inner());

    let revenue = RevenueService::new(&state.db, &state.audit)
        .update(id, request, context)
        .await?;
    Ok(Json(revenue))
}

async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let context = auth_user.request_context(client_ip.into_inner());

    RevenueService::new(&state.db, &state.audit)
        .delete(id, context)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ImportOutcome>)> {
    let content = read_upload(multipart).await?;
    let context = auth_user.request_context(client_ip.into_inner());

    let outcome = RevenueService::new(&state.db, &state.audit)
        .import_csv(&content, context)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn rollback_batch(
    State(state): State<AppState>,
    auth_user: AuthUser,
    client_ip: ClientIp,
    Path(batch_id): Path<String>,
) -> AppResult<Json<RollbackOutcome>> {
    let context = auth_user.request_context(client_ip.into_inner());

    let outcome = RevenueService::new(&state.db, &state.audit)
        .rollback_batch(&batch_id, context)
        .await?;
    Ok(Json(outcome))
}

/// Pull the first file field out of a multipart upload.
pub(super) async fn read_upload(mut multipart: Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("failed to read upload: {e}")))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::bad_request("missing file field in upload"))
}
