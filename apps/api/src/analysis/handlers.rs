//! Axum route handler for the tender analysis chat.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::context_selector::{select_context, SelectionPolicy};
use crate::analysis::prompt_assembler::assemble_messages;
use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::llm_client::ChatCompleter;
use crate::models::chat::{ChatMessage, Role};
use crate::models::tender::TenderRecord;
use crate::state::AppState;
use crate::store::TenderStore;

/// Accepts either a single `message` or a full `messages` history.
/// `tenders` overrides the stored records when present.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub tenders: Option<Vec<TenderRecord>>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub content: String,
}

impl AnalyzeRequest {
    /// Collapses both input shapes into one history. A lone `message` is a
    /// one-element user history. A non-empty `messages` wins over `message`.
    pub fn history(&mut self) -> Result<Vec<ChatMessage>, AppError> {
        if let Some(messages) = self.messages.take().filter(|m| !m.is_empty()) {
            return Ok(messages);
        }

        match self.message.take().filter(|m| !m.trim().is_empty()) {
            Some(message) => Ok(vec![ChatMessage::user(message)]),
            None => Err(AppError::Validation("No message provided".to_string())),
        }
    }
}

/// Selects context for the latest message, assembles the prompt and returns the
/// model's reply verbatim.
pub async fn analyze(
    store: &dyn TenderStore,
    completer: &dyn ChatCompleter,
    policy: &SelectionPolicy,
    mut request: AnalyzeRequest,
) -> Result<String, AppError> {
    let history = request.history()?;
    let query = history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .or(history.last())
        .map(|m| m.content.clone())
        .unwrap_or_default();

    let records = match request.tenders.take() {
        Some(tenders) => tenders,
        None => store.list().await?,
    };
    let total = records.len();

    let selection = select_context(&query, records, policy);
    info!(
        "Context selection: path={:?}, matched={}, selected={}/{}",
        selection.path,
        selection.match_count,
        selection.records.len(),
        total
    );

    let messages = assemble_messages(&selection.records, &history)?;
    let content = completer.complete(&messages).await?;

    Ok(content)
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let content = analyze(
        state.store.as_ref(),
        state.completer.as_ref(),
        &state.config.selection,
        request,
    )
    .await?;

    Ok(Json(AnalyzeResponse { content }))
}
