// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Appended to every analysis instruction. Invented figures are the main risk.
pub const NO_FABRICATION_RU: &str = "\
Никогда не выдумывай цены, ставки, маршруты или статистику. \
Используй только числа из переданных данных. \
Если данных не хватает для вывода — прямо скажи об этом.";

/// Output format requested from the analysis assistant.
pub const CONCISE_FORMAT_RU: &str = "\
Отвечай на русском языке, кратко и структурированно: \
используй markdown, а для сравнения цен — таблицу.";

/// Enforces bare JSON-array output for extraction calls.
pub const JSON_ARRAY_ONLY: &str = "\
Return ONLY the JSON array. \
Do NOT use markdown code fences. \
Do NOT include any text, explanations or apologies outside the array.";
