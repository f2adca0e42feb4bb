//! Context Selector: picks which tender records the analysis model gets to see.
//!
//! Keyword matching runs against origin, destination and comment. Matches are only
//! trusted when there are many of them; a handful of hits is treated as noise and
//! the full recency-ordered history is used instead. Either way the result is
//! capped so the prompt stays inside the model's input budget.

use serde::Serialize;

use crate::models::tender::TenderRecord;

/// Tokens must be longer than this many characters to count as keywords.
const MIN_KEYWORD_CHARS: usize = 3;

/// Selection thresholds. Loaded from config; defaults are 50 and 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Matched records are preferred only when strictly more than this many match.
    pub match_threshold: usize,
    /// Hard cap on the number of records handed to the model.
    pub max_records: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            match_threshold: 50,
            max_records: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionPath {
    /// Enough keyword matches; only matched records were kept.
    Matched,
    /// Too few matches; the whole record set was used.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub records: Vec<TenderRecord>,
    pub path: SelectionPath,
    pub match_count: usize,
}

/// Lower-cases the message, splits on anything that is not a letter or digit,
/// and keeps tokens longer than three characters.
pub fn extract_keywords(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() > MIN_KEYWORD_CHARS && !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }

    keywords
}

/// True if any keyword is a substring of the record's origin, destination or comment.
/// Keywords must already be lower-case.
pub fn matches_keywords(record: &TenderRecord, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }

    let fields = [
        record.origin.to_lowercase(),
        record.destination.to_lowercase(),
        record.comment.to_lowercase(),
    ];

    keywords
        .iter()
        .any(|kw| fields.iter().any(|field| field.contains(kw.as_str())))
}

/// Selects the records to expose to the model for `query`.
///
/// Algorithm:
/// 1. Extract keywords from the query
/// 2. Count records matching any keyword
/// 3. More than `match_threshold` matches → keep only the matches
/// 4. Otherwise → keep every record
/// 5. Truncate to `max_records`, preserving input order (most recent first)
pub fn select_context(
    query: &str,
    records: Vec<TenderRecord>,
    policy: &SelectionPolicy,
) -> Selection {
    let keywords = extract_keywords(query);
    let mask: Vec<bool> = records
        .iter()
        .map(|r| matches_keywords(r, &keywords))
        .collect();
    let match_count = mask.iter().filter(|&&m| m).count();

    let (path, mut selected) = if match_count > policy.match_threshold {
        let matched: Vec<TenderRecord> = records
            .into_iter()
            .zip(mask)
            .filter_map(|(record, hit)| hit.then_some(record))
            .collect();
        (SelectionPath::Matched, matched)
    } else {
        (SelectionPath::Fallback, records)
    };

    selected.truncate(policy.max_records);

    Selection {
        records: selected,
        path,
        match_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tender::NewTender;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_record(origin: &str, destination: &str, comment: &str) -> TenderRecord {
        TenderRecord::from_new(
            Uuid::new_v4(),
            NewTender {
                origin: origin.to_string(),
                destination: destination.to_string(),
                comment: comment.to_string(),
                price: Some(100000.0),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn almaty_set(matching: usize, unrelated: usize) -> Vec<TenderRecord> {
        let mut records: Vec<_> = (0..matching)
            .map(|i| make_record(&format!("Склад {i}"), "Алматы", ""))
            .collect();
        records.extend((0..unrelated).map(|_| make_record("Астана", "Караганда", "")));
        records
    }

    #[test]
    fn test_keywords_skip_short_tokens_and_punctuation() {
        let keywords = extract_keywords("Цена на Алматы, а также Нур-Султан?");
        assert_eq!(keywords, vec!["цена", "алматы", "также", "султан"]);
    }

    #[test]
    fn test_keywords_count_characters_not_bytes() {
        // "цена" is 4 characters but 8 bytes; "кто" is 3 characters and must be dropped
        assert_eq!(extract_keywords("кто цена"), vec!["цена"]);
    }

    #[test]
    fn test_keywords_are_deduplicated() {
        assert_eq!(extract_keywords("Алматы алматы АЛМАТЫ"), vec!["алматы"]);
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let record = make_record("Алматы", "Астана", "");
        assert!(!matches_keywords(&record, &[]));
        assert!(extract_keywords("на в до").is_empty());
    }

    #[test]
    fn test_match_checks_comment_case_insensitively() {
        let record = make_record("", "", "Нужен РЕФрижератор");
        assert!(matches_keywords(&record, &["рефрижератор".to_string()]));
    }

    #[test]
    fn test_scenario_sixty_matches_preferred() {
        let records = almaty_set(60, 5);
        let expected_ids: Vec<_> = records.iter().take(60).map(|r| r.id).collect();

        let selection = select_context("цена на Алматы", records, &SelectionPolicy::default());

        assert_eq!(selection.path, SelectionPath::Matched);
        assert_eq!(selection.match_count, 60);
        let ids: Vec<_> = selection.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, expected_ids, "Matched subset must keep input order");
        assert!(selection.records.iter().all(|r| r.destination == "Алматы"));
    }

    #[test]
    fn test_scenario_no_match_falls_back_to_all() {
        let records: Vec<_> = (0..10).map(|_| make_record("Астана", "Алматы", "")).collect();
        let selection = select_context(
            "почем обычно возим в Павлодар",
            records,
            &SelectionPolicy::default(),
        );

        assert_eq!(selection.path, SelectionPath::Fallback);
        assert_eq!(selection.match_count, 0);
        assert_eq!(selection.records.len(), 10);
    }

    #[test]
    fn test_exactly_threshold_matches_falls_back() {
        let selection = select_context("алматы", almaty_set(50, 5), &SelectionPolicy::default());
        assert_eq!(selection.path, SelectionPath::Fallback);
        assert_eq!(selection.records.len(), 55);
    }

    #[test]
    fn test_one_over_threshold_prefers_matches() {
        let selection = select_context("алматы", almaty_set(51, 5), &SelectionPolicy::default());
        assert_eq!(selection.path, SelectionPath::Matched);
        assert_eq!(selection.records.len(), 51);
        assert!(selection.records.iter().all(|r| r.destination == "Алматы"));
    }

    #[test]
    fn test_fallback_truncates_to_cap() {
        let records: Vec<_> = (0..401).map(|_| make_record("Астана", "Кокшетау", "")).collect();
        let first_id = records[0].id;
        let last_kept = records[399].id;

        let selection = select_context("", records, &SelectionPolicy::default());
        assert_eq!(selection.records.len(), 400);
        assert_eq!(selection.records[0].id, first_id);
        assert_eq!(selection.records[399].id, last_kept);
    }

    #[test]
    fn test_exactly_cap_is_untouched() {
        let records: Vec<_> = (0..400).map(|_| make_record("Астана", "Кокшетау", "")).collect();
        let selection = select_context("", records, &SelectionPolicy::default());
        assert_eq!(selection.records.len(), 400);
    }

    #[test]
    fn test_matched_path_also_capped() {
        let selection = select_context("алматы", almaty_set(450, 10), &SelectionPolicy::default());
        assert_eq!(selection.path, SelectionPath::Matched);
        assert_eq!(selection.records.len(), 400);
        assert!(selection.records.iter().all(|r| r.destination == "Алматы"));
    }

    #[test]
    fn test_output_never_exceeds_cap() {
        let policy = SelectionPolicy::default();
        for (matching, unrelated) in [(0, 0), (10, 900), (600, 600), (49, 2), (1000, 0)] {
            for query in ["", "алматы", "караганда", "что по ценам"] {
                let selection = select_context(query, almaty_set(matching, unrelated), &policy);
                assert!(selection.records.len() <= policy.max_records);
            }
        }
    }

    #[test]
    fn test_empty_record_set_returns_empty() {
        let selection = select_context("алматы", Vec::new(), &SelectionPolicy::default());
        assert!(selection.records.is_empty());
        assert_eq!(selection.path, SelectionPath::Fallback);
    }

    #[test]
    fn test_custom_policy_is_honoured() {
        let policy = SelectionPolicy {
            match_threshold: 2,
            max_records: 3,
        };
        let selection = select_context("алматы", almaty_set(5, 5), &policy);
        assert_eq!(selection.path, SelectionPath::Matched);
        assert_eq!(selection.records.len(), 3);
    }
}
