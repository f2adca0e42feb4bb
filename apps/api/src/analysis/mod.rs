// Tender analysis: context selection, prompt assembly and the chat endpoint.
// All LLM calls go through llm_client; handlers only see the ChatCompleter trait.

pub mod context_selector;
pub mod handlers;
pub mod prompt_assembler;
pub mod prompts;
