//! Axum route handlers for tender records.

use axum::{
    extract::{rejection::StringRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extractors::{AppJson, AppPath};
use crate::models::tender::{NewTender, TenderRecord};
use crate::state::AppState;
use crate::tenders::importer::{read_rows, rows_to_drafts};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// A hand-entered tender is meaningless without our price.
fn validate_manual_entry(draft: &NewTender) -> Result<(), AppError> {
    if draft.price.is_none() {
        return Err(AppError::Validation(
            "price is required and must be a number".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/v1/tenders
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<TenderRecord>>, AppError> {
    Ok(Json(state.store.list().await?))
}

/// POST /api/v1/tenders
pub async fn handle_create(
    State(state): State<AppState>,
    AppJson(draft): AppJson<NewTender>,
) -> Result<(StatusCode, Json<TenderRecord>), AppError> {
    validate_manual_entry(&draft)?;
    let record = state.store.create(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/tenders/:id
///
/// Full replacement. Id and creation time are kept; every other field is overwritten.
pub async fn handle_replace(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<NewTender>,
) -> Result<Json<TenderRecord>, AppError> {
    validate_manual_entry(&draft)?;
    state
        .store
        .replace(id, draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Tender {id} not found")))
}

/// DELETE /api/v1/tenders/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!("Tender {id} not found")));
    }
    Ok(Json(DeleteResponse { deleted: true }))
}

/// DELETE /api/v1/tenders
pub async fn handle_clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, AppError> {
    let deleted = state.store.clear().await?;
    info!("Cleared {deleted} tenders");
    Ok(Json(ClearResponse { deleted }))
}

/// POST /api/v1/tenders/import
///
/// Body is the CSV export of a tender register.
pub async fn handle_import(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    let body = body?;
    if body.trim().is_empty() {
        return Err(AppError::Validation("import file is empty".to_string()));
    }

    let drafts = read_rows(&body)
        .and_then(|rows| rows_to_drafts(&rows))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let imported = if drafts.is_empty() {
        0
    } else {
        state.store.create_many(drafts).await?.len()
    };

    info!("Imported {imported} tenders");
    Ok(Json(ImportResponse { imported }))
}
