use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// ISO dates, inclusive.
    pub from: String,
    pub to: String,
    pub days: i64,
}

/// A generated habit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub period: ReportPeriod,
    pub highlights: Vec<String>,
    pub next_actions: Vec<String>,
    pub raw_text: String,
    /// Which generator produced the text.
    pub model: String,
}
