// Extraction of tender records from pasted free text.
// All LLM calls go through llm_client; no direct HTTP calls here.

pub mod handlers;
pub mod parser;
pub mod prompts;
