//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod document;
pub mod entries;
pub mod health;
pub mod months;
pub mod stats;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(document::routes())
        .merge(months::routes())
        .merge(entries::routes())
        .merge(stats::routes())
}
