use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lenient;

/// Outcome of a tender. Unknown outcomes are always recorded as `Lost`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TenderStatus {
    Won,
    #[default]
    Lost,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Won => "Won",
            TenderStatus::Lost => "Lost",
        }
    }

    /// Maps free text to a status. Anything not recognised as a win is `Lost`.
    pub fn from_loose(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let is_win = matches!(
            lowered.as_str(),
            "won" | "win" | "winner" | "выигран" | "выиграно" | "выиграли" | "победа"
        );
        if is_win {
            TenderStatus::Won
        } else {
            TenderStatus::Lost
        }
    }
}

impl<'de> Deserialize<'de> for TenderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => TenderStatus::from_loose(&s),
            _ => TenderStatus::Lost,
        })
    }
}

/// A tender as submitted by a form, an import row or the extraction model.
/// Has no identity until the store accepts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTender {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub transport_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub pallets: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub cubes: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub places: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub carrier_price: Option<f64>,
    #[serde(default)]
    pub status: TenderStatus,
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: String,
    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
}

impl NewTender {
    /// True when the draft has neither a route nor a price.
    pub fn is_blank(&self) -> bool {
        self.origin.is_empty() && self.destination.is_empty() && self.price.is_none()
    }

    /// Fills the date with `today` when absent.
    pub fn with_default_date(mut self, today: NaiveDate) -> Self {
        self.date.get_or_insert(today);
        self
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// One stored historical bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderRecord {
    #[serde(default = "Uuid::new_v4", deserialize_with = "lenient::id_or_new")]
    pub id: Uuid,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub origin: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub transport_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub pallets: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub cubes: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub places: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub capacity: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub carrier_price: Option<f64>,
    #[serde(default)]
    pub status: TenderStatus,
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: String,
    #[serde(default = "today", deserialize_with = "lenient::date_or_today")]
    pub date: NaiveDate,
    #[serde(default = "Utc::now", deserialize_with = "lenient::timestamp_or_now")]
    pub created_at: DateTime<Utc>,
}

impl TenderRecord {
    /// Gives a draft its identity. A missing date becomes the creation date.
    pub fn from_new(id: Uuid, draft: NewTender, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            origin: draft.origin,
            destination: draft.destination,
            transport_type: draft.transport_type,
            weight: draft.weight,
            pallets: draft.pallets,
            cubes: draft.cubes,
            places: draft.places,
            capacity: draft.capacity,
            price: draft.price,
            carrier_price: draft.carrier_price,
            status: draft.status,
            comment: draft.comment,
            date: draft.date.unwrap_or_else(|| created_at.date_naive()),
            created_at,
        }
    }
}

/// Row shape of the `tenders` table.
#[derive(Debug, Clone, FromRow)]
pub struct TenderRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub transport_type: Option<String>,
    pub weight: Option<String>,
    pub pallets: Option<String>,
    pub cubes: Option<String>,
    pub places: Option<String>,
    pub capacity: Option<String>,
    pub price: Option<f64>,
    pub carrier_price: Option<f64>,
    pub status: String,
    pub comment: String,
    pub tender_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<TenderRow> for TenderRecord {
    fn from(row: TenderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            origin: row.origin,
            destination: row.destination,
            transport_type: row.transport_type,
            weight: row.weight,
            pallets: row.pallets,
            cubes: row.cubes,
            places: row.places,
            capacity: row.capacity,
            price: row.price,
            carrier_price: row.carrier_price,
            status: TenderStatus::from_loose(&row.status),
            comment: row.comment,
            date: row.tender_date,
            created_at: row.created_at,
        }
    }
}
