//! Prompt Assembler: builds the exact message list sent to the completion API.
//!
//! Output is one synthesized system message followed by the conversation history,
//! untouched and in order.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::prompts::{
    ANALYSIS_NO_DATA_TEMPLATE, ANALYSIS_WITH_DATA_TEMPLATE, INSUFFICIENT_DATA_REPLY,
    PRICE_RECOMMENDATION_STEP,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{CONCISE_FORMAT_RU, NO_FABRICATION_RU};
use crate::models::chat::ChatMessage;
use crate::models::tender::{TenderRecord, TenderStatus};

/// The slice of a record the model sees. Ids and timestamps only cost tokens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptTender<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    origin: &'a str,
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    transport_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pallets: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cubes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    places: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<&'a str>,
    price: Option<f64>,
    carrier_price: Option<f64>,
    status: TenderStatus,
    #[serde(skip_serializing_if = "str::is_empty")]
    comment: &'a str,
    date: NaiveDate,
}

impl<'a> From<&'a TenderRecord> for PromptTender<'a> {
    fn from(record: &'a TenderRecord) -> Self {
        Self {
            name: record.name.as_deref(),
            origin: &record.origin,
            destination: &record.destination,
            transport_type: record.transport_type.as_deref(),
            weight: record.weight.as_deref(),
            pallets: record.pallets.as_deref(),
            cubes: record.cubes.as_deref(),
            places: record.places.as_deref(),
            capacity: record.capacity.as_deref(),
            price: record.price,
            carrier_price: record.carrier_price,
            status: record.status,
            comment: &record.comment,
            date: record.date,
        }
    }
}

/// Builds the system instruction for the selected records.
///
/// With no records the instruction demands a plain "insufficient data" answer
/// and carries no price-recommendation step at all.
pub fn build_system_prompt(selected: &[TenderRecord]) -> Result<String, AppError> {
    if selected.is_empty() {
        return Ok(ANALYSIS_NO_DATA_TEMPLATE
            .replace("{insufficient_reply}", INSUFFICIENT_DATA_REPLY)
            .replace("{format}", CONCISE_FORMAT_RU));
    }

    let listing: Vec<PromptTender<'_>> = selected.iter().map(PromptTender::from).collect();
    let tenders_json = serde_json::to_string_pretty(&listing)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize tenders: {e}")))?;

    Ok(ANALYSIS_WITH_DATA_TEMPLATE
        .replace("{count}", &selected.len().to_string())
        .replace("{recommendation_step}", PRICE_RECOMMENDATION_STEP)
        .replace("{format}", CONCISE_FORMAT_RU)
        .replace("{no_fabrication}", NO_FABRICATION_RU)
        .replace("{tenders_json}", &tenders_json))
}

/// System instruction first, then the history exactly as given.
pub fn assemble_messages(
    selected: &[TenderRecord],
    history: &[ChatMessage],
) -> Result<Vec<ChatMessage>, AppError> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(build_system_prompt(selected)?));
    messages.extend_from_slice(history);
    Ok(messages)
}
