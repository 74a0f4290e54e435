//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over one shared document
//! - JSON error responses built from `AppError`
//! - Persistence of every successful mutation

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use apunta_core::currency::RateReconciler;
use apunta_core::ledger::Document;
use apunta_core::storage::DocumentStore;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The document, guarded by a single process-wide lock.
    pub document: Arc<RwLock<Document>>,
    /// Where the document is persisted after each mutation.
    pub store: Arc<DocumentStore>,
    /// Rate reconciler used by `/rates/reconcile`.
    pub reconciler: Arc<RateReconciler>,
}

impl AppState {
    /// Creates state around an already loaded document.
    #[must_use]
    pub fn new(document: Document, store: DocumentStore, reconciler: RateReconciler) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
            store: Arc::new(store),
            reconciler: Arc::new(reconciler),
        }
    }

    /// Saves `document` through the store.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn persist(&self, document: &Document) -> Result<(), ApiError> {
        self.store.save(document).await.map_err(|e| {
            tracing::error!(error = %e, path = %self.store.path(), "Failed to save document");
            ApiError::from(e)
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
