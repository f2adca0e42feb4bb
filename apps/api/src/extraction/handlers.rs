//! Axum route handler for text extraction.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::extraction::parser::extract_tenders;
use crate::models::tender::NewTender;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: String,
    /// Persist the extracted drafts straight away.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub tenders: Vec<NewTender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_ids: Option<Vec<Uuid>>,
}

/// POST /api/v1/extract
///
/// Extracts tenders from pasted text. Nothing is stored unless `save` is set.
pub async fn handle_extract(
    State(state): State<AppState>,
    AppJson(request): AppJson<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let today = Utc::now().date_naive();
    let tenders = extract_tenders(state.completer.as_ref(), &request.text, today).await?;

    let saved_ids = if request.save && !tenders.is_empty() {
        let records = state.store.create_many(tenders.clone()).await?;
        Some(records.into_iter().map(|r| r.id).collect())
    } else {
        None
    };

    Ok(Json(ExtractResponse { tenders, saved_ids }))
}
