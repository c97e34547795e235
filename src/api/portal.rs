//! Public portal endpoints
//!
//! Read-only consultation surface: no authentication, no internal
//! columns in the payloads.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{FaqRepository, RevenueRepository, SettingsRepository};
use crate::models::{
    Faq, FaqQuery, Page, PublicRevenue, PublicRevenueQuery, RevenueSummary, SiteSettings,
};
use crate::services::{export, ExportFormat, RevenueService};
use crate::utils::AppResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/revenues", get(list_revenues))
        .route("/revenues/summary", get(revenue_summary))
        .route("/revenues/years", get(revenue_years))
        .route("/revenues/export", get(export_revenues))
        .route("/faqs", get(list_faqs))
        .route("/settings", get(get_settings))
}

async fn list_revenues(
    State(state): State<AppState>,
    Query(query): Query<PublicRevenueQuery>,
) -> AppResult<Json<Page<PublicRevenue>>> {
    let page = RevenueService::new(&state.db, &state.audit)
        .list(&query.into_query())
        .await?;

    Ok(Json(Page::new(
        page.items.into_iter().map(PublicRevenue::from).collect(),
        page.total,
        page.page,
        page.per_page,
    )))
}

async fn revenue_summary(
    State(state): State<AppState>,
    Query(query): Query<PublicRevenueQuery>,
) -> AppResult<Json<RevenueSummary>> {
    let summary = RevenueService::new(&state.db, &state.audit)
        .summary(&query.into_query())
        .await?;
    Ok(Json(summary))
}

async fn revenue_years(State(state): State<AppState>) -> AppResult<Json<Vec<i32>>> {
    let years = RevenueRepository::new(&state.db).distinct_years().await?;
    Ok(Json(years))
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    format: ExportFormat,
}

async fn export_revenues(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
    Query(query): Query<PublicRevenueQuery>,
) -> AppResult<Response> {
    let records = RevenueRepository::new(&state.db)
        .find_filtered(&query.into_query())
        .await?;

    let response = match params.format {
        ExportFormat::Csv => {
            let csv = export::render_csv(&records);
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export::CSV_FILENAME),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        ExportFormat::Pdf => {
            let settings = SettingsRepository::new(&state.db).get().await?;
            let pdf = export::render_pdf(&records, settings.entity_name.as_deref())?;
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export::PDF_FILENAME),
                    ),
                ],
                pdf,
            )
                .into_response()
        }
    };

    Ok(response)
}

async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqQuery>,
) -> AppResult<Json<Page<Faq>>> {
    let (items, total) = FaqRepository::new(&state.db).list_active(&query).await?;
    Ok(Json(Page::new(items, total, query.page, query.per_page)))
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<SiteSettings>> {
    let settings = SettingsRepository::new(&state.db).get().await?;
    Ok(Json(settings))
}
