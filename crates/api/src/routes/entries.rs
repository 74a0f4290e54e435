//! Entry routes.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Serialize;

use apunta_core::ledger::{EntryInput, EntryPlacement};

use crate::{ApiError, AppState};

/// Creates the entry routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/entries", post(add_entry))
}

/// Response for `POST /entries`.
#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    /// Where the entry went.
    #[serde(flatten)]
    pub placement: EntryPlacement,
    /// Human readable outcome.
    pub message: String,
}

/// POST `/entries` - Add an entry from raw input.
///
/// 201 when stored, 202 when no month covers the date and the entry was
/// dropped.
async fn add_entry(
    State(state): State<AppState>,
    Json(input): Json<EntryInput>,
) -> Result<(StatusCode, Json<AddEntryResponse>), ApiError> {
    let mut document = state.document.write().await;
    let placement = document.add_entry_input(&input)?;

    let (status, message) = match &placement {
        EntryPlacement::Added { group_name } => {
            state.persist(&document).await?;
            (StatusCode::CREATED, format!("Entry added to {group_name}"))
        }
        EntryPlacement::Dropped { date } => (
            StatusCode::ACCEPTED,
            format!("No month covers {date}, entry dropped"),
        ),
    };

    Ok((status, Json(AddEntryResponse { placement, message })))
}
