//! API routes and handlers
//!
//! All endpoints live under `/api/v1`. The portal and expense listings
//! are public; everything that mutates data requires a bearer token.

use axum::Router;

use crate::AppState;

mod audit_logs;
mod auth;
mod expenses;
mod faqs;
mod health;
mod portal;
mod revenues;
mod settings;
mod users;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health::routes())
        .nest("/auth", auth::public_routes())
        .nest("/portal", portal::routes())
        .nest("/expenses", expenses::public_routes())
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::protected_routes())
        .nest("/revenues", revenues::routes())
        .nest("/expenses", expenses::protected_routes())
        .nest("/users", users::routes())
        .nest("/faqs", faqs::routes())
        .nest("/settings", settings::routes())
        .nest("/audit-logs", audit_logs::routes())
}

/// Create the full API router (public + protected; useful for tests)
pub fn routes() -> Router<AppState> {
    public_routes().merge(protected_routes())
}
