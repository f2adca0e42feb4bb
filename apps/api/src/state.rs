use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatCompleter;
use crate::store::TenderStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store. PostgreSQL when configured, in-memory otherwise.
    pub store: Arc<dyn TenderStore>,
    /// Completion gateway. `LlmClient` in production, scripted in tests.
    pub completer: Arc<dyn ChatCompleter>,
    pub config: Config,
}
