//! Extraction Assembler: turns pasted free text into tender drafts via the LLM.
//!
//! Parsing is all-or-nothing: invalid JSON, a non-array reply, or any element
//! that is not an object fails the whole extraction. Inside a valid object each
//! field is read leniently, and entries with no route and no price are dropped.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::prompts::EXTRACTION_SYSTEM_TEMPLATE;
use crate::llm_client::prompts::JSON_ARRAY_ONLY;
use crate::llm_client::{strip_json_fences, ChatCompleter, LlmError};
use crate::models::chat::ChatMessage;
use crate::models::tender::NewTender;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a JSON array of tenders")]
    NotAnArray,

    #[error("tender at index {index} is not a JSON object")]
    InvalidEntry { index: usize },
}

pub fn build_extraction_prompt(today: NaiveDate) -> String {
    EXTRACTION_SYSTEM_TEMPLATE
        .replace("{today}", &today.format("%Y-%m-%d").to_string())
        .replace("{json_only}", JSON_ARRAY_ONLY)
}

/// Sends `text` to the model and parses its reply into normalized drafts.
pub async fn extract_tenders(
    completer: &dyn ChatCompleter,
    text: &str,
    today: NaiveDate,
) -> Result<Vec<NewTender>, ExtractionError> {
    let messages = vec![
        ChatMessage::system(build_extraction_prompt(today)),
        ChatMessage::user(text),
    ];

    let reply = completer.complete(&messages).await?;
    let drafts = parse_extraction_reply(&reply, today)?;

    info!("Extracted {} tenders from {} chars of text", drafts.len(), text.chars().count());
    Ok(drafts)
}

/// Parses a model reply into drafts.
///
/// Steps:
/// 1. Strip surrounding code fences
/// 2. Parse as JSON; on failure retry on the outermost `[...]` span
/// 3. Accept a bare array, or an object wrapping one under `tenders`
/// 4. Reject the whole reply if any element is not an object
/// 5. Drop blank entries, then normalize defaults
pub fn parse_extraction_reply(
    reply: &str,
    today: NaiveDate,
) -> Result<Vec<NewTender>, ExtractionError> {
    let items = match parse_json(reply)? {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("tenders") {
            Some(Value::Array(items)) => items,
            _ => return Err(ExtractionError::NotAnArray),
        },
        _ => return Err(ExtractionError::NotAnArray),
    };

    let mut drafts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(ExtractionError::InvalidEntry { index });
        }

        let draft: NewTender = serde_json::from_value(item)?;
        if draft.is_blank() {
            warn!("Dropping extracted tender {index}: no route and no price");
            continue;
        }
        drafts.push(normalize(draft, today));
    }

    Ok(drafts)
}

/// Re-applies the defaults the prompt asks for. A missing date becomes `today`;
/// the status type already maps anything unclear to `Lost`.
pub fn normalize(draft: NewTender, today: NaiveDate) -> NewTender {
    draft.with_default_date(today)
}

fn parse_json(reply: &str) -> Result<Value, ExtractionError> {
    let body = strip_json_fences(reply);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(err) => {
            let bracketed = body
                .find('[')
                .zip(body.rfind(']'))
                .filter(|(start, end)| start < end)
                .and_then(|(start, end)| serde_json::from_str::<Value>(&body[start..=end]).ok());
            bracketed.ok_or(ExtractionError::Parse(err))
        }
    }
}
