use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::context_selector::SelectionPolicy;

const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required at startup. Without `DATABASE_URL` the service runs
/// on the in-memory store; without `LLM_API_KEY` the AI endpoints fail on first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmConfig,
    pub selection: SelectionPolicy,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Limit for a single HTTP attempt.
    pub timeout_secs: u64,
    /// Limit for the whole call, retries and backoff included.
    pub deadline_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout_secs: 45,
            deadline_secs: 60,
            max_retries: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_defaults = LlmConfig::default();
        let selection_defaults = SelectionPolicy::default();

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm: LlmConfig {
                api_key: optional_env("LLM_API_KEY"),
                base_url: optional_env("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
                model: optional_env("LLM_MODEL").unwrap_or(llm_defaults.model),
                timeout_secs: parse_env("LLM_TIMEOUT_SECS", llm_defaults.timeout_secs)?,
                deadline_secs: parse_env("LLM_DEADLINE_SECS", llm_defaults.deadline_secs)?,
                max_retries: parse_env("LLM_MAX_RETRIES", llm_defaults.max_retries)?,
            },
            selection: SelectionPolicy {
                match_threshold: parse_env(
                    "SELECTION_MATCH_THRESHOLD",
                    selection_defaults.match_threshold,
                )?,
                max_records: parse_env("SELECTION_MAX_RECORDS", selection_defaults.max_records)?,
            },
        })
    }
}

/// Reads a variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
