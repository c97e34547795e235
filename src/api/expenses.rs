//! Expense endpoints

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::models::{ExpenseQuery, ExpenseWithCreditor, Page};
use crate::services::{ExpenseImportOutcome, ExpenseService};
use crate::utils::AppResult;
use crate::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/", get(list))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/import", post(import))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ExpenseQuery>,
) -> AppResult<Json<Page<ExpenseWithCreditor>>> {
    let page = ExpenseService::new(&state.db).list(&query).await?;
    Ok(Json(page))
}

async fn import(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ExpenseImportOutcome>)> {
    let content = super::revenues::read_upload(multipart).await?;

    let outcome = ExpenseService::new(&state.db).import_csv(&content).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
