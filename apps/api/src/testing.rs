//! Test doubles shared by handler and router tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{ChatCompleter, LlmError};
use crate::models::chat::ChatMessage;

enum Reply {
    Text(String),
    Timeout,
    Upstream(String),
}

/// A `ChatCompleter` that returns a fixed reply and records what it was sent.
pub struct ScriptedCompleter {
    reply: Reply,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompleter {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(Reply::Text(text.into()))
    }

    pub fn timing_out() -> Self {
        Self::with(Reply::Timeout)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with(Reply::Upstream(message.into()))
    }

    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompleter for ScriptedCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Timeout => Err(LlmError::Timeout { attempts: 3 }),
            Reply::Upstream(message) => Err(LlmError::Api {
                status: 401,
                message: message.clone(),
            }),
        }
    }
}

/// App state over an empty in-memory store and the given completer.
pub fn test_state(completer: std::sync::Arc<ScriptedCompleter>) -> crate::state::AppState {
    use crate::analysis::context_selector::SelectionPolicy;
    use crate::config::{Config, LlmConfig};
    use crate::store::InMemoryTenderStore;

    crate::state::AppState {
        store: std::sync::Arc::new(InMemoryTenderStore::new()),
        completer,
        config: Config {
            database_url: None,
            port: 0,
            rust_log: "info".to_string(),
            llm: LlmConfig::default(),
            selection: SelectionPolicy::default(),
        },
    }
}
