//! Whole-document route.

use axum::{Json, Router, extract::State, routing::get};

use apunta_core::ledger::Document;

use crate::AppState;

/// GET `/document` - The full document.
async fn get_document(State(state): State<AppState>) -> Json<Document> {
    Json(state.document.read().await.clone())
}

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/document", get(get_document))
}
