//! Lenient field readers for tender payloads.
//!
//! Tender data arrives from hand-filled forms, spreadsheets and model output, so
//! every field is read permissively: numbers may be strings, text may be numbers,
//! and anything that cannot be understood becomes `None` rather than a zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Date formats accepted for tender dates, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y.%m.%d"];

pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value))
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_text(deserializer)?.unwrap_or_default())
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Record ids from clients are opaque. Only a UUID string is kept; numeric
/// ids, blanks and garbage get a fresh id.
pub fn id_or_new<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Uuid::parse_str(s.trim()).unwrap_or_else(|_| Uuid::new_v4()),
        _ => Uuid::new_v4(),
    })
}

pub fn date_or_today<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_date(deserializer)?.unwrap_or_else(|| Utc::now().date_naive()))
}

/// Accepts an RFC 3339 string or epoch milliseconds. Anything else is now.
pub fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses a human-written amount such as `"120 000 ₸"`, `"85000.50"` or `"1,5"`.
///
/// A single comma followed by at most two digits is a decimal separator; any
/// other comma is a thousands separator. Returns `None` when no digits remain.
pub fn parse_number(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let comma_count = kept.matches(',').count();
    let decimal_comma = !kept.contains('.')
        && comma_count == 1
        && kept.rsplit(',').next().is_some_and(|tail| tail.len() <= 2);

    let normalized = if decimal_comma {
        kept.replace(',', ".")
    } else {
        kept.replace(',', "")
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_strips_currency_and_spaces() {
        assert_eq!(parse_number("120 000 ₸"), Some(120000.0));
        assert_eq!(parse_number("85000.50"), Some(85000.5));
    }

    #[test]
    fn test_parse_number_comma_handling() {
        assert_eq!(parse_number("1,5"), Some(1.5));
        assert_eq!(parse_number("120,000"), Some(120000.0));
        assert_eq!(parse_number("1,200.75"), Some(1200.75));
    }

    #[test]
    fn test_parse_number_without_digits_is_absent() {
        assert_eq!(parse_number("договорная"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
    }

    #[test]
    fn test_zero_is_a_valid_number() {
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(number_from_value(&json!(0)), Some(0.0));
    }

    #[test]
    fn test_text_from_number_value() {
        assert_eq!(text_from_value(&json!(20)), Some("20".to_string()));
        assert_eq!(text_from_value(&json!("  ")), None);
        assert_eq!(text_from_value(&json!(null)), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("15.03.2024"), Some(expected));
        assert_eq!(parse_date("15/03/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-15T10:00:00Z"), Some(expected));
        assert_eq!(parse_date("вчера"), None);
    }

    #[derive(Debug, Deserialize)]
    struct Identified {
        #[serde(default = "Uuid::new_v4", deserialize_with = "id_or_new")]
        id: Uuid,
        #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_uuid_string_id_is_kept() {
        let id = Uuid::new_v4();
        let parsed: Identified = serde_json::from_value(json!({ "id": id.to_string() })).unwrap();
        assert_eq!(parsed.id, id);
    }

    #[test]
    fn test_numeric_and_missing_ids_get_fresh_uuid() {
        let numeric: Identified = serde_json::from_value(json!({ "id": 1700000000000u64 })).unwrap();
        let missing: Identified = serde_json::from_value(json!({})).unwrap();
        let garbage: Identified = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        assert_ne!(numeric.id, missing.id);
        assert_ne!(garbage.id, Uuid::nil());
    }

    #[test]
    fn test_timestamp_accepts_epoch_millis() {
        let parsed: Identified = serde_json::from_value(json!({ "at": 1700000000000i64 })).unwrap();
        assert_eq!(parsed.at.timestamp(), 1_700_000_000);

        let parsed: Identified =
            serde_json::from_value(json!({ "at": "2024-03-15T10:00:00+05:00" })).unwrap();
        assert_eq!(parsed.at.to_rfc3339(), "2024-03-15T05:00:00+00:00");
    }
}
