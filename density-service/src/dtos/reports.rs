use crate::models::ReportRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGenerateRequest {
    #[serde(default)]
    pub period_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGenerateResponse {
    pub report_id: String,
    pub highlights: Vec<String>,
    pub next_actions: Vec<String>,
    pub raw_text: String,
}

impl From<&ReportRecord> for ReportGenerateResponse {
    fn from(record: &ReportRecord) -> Self {
        Self {
            report_id: record.id.clone(),
            highlights: record.highlights.clone(),
            next_actions: record.next_actions.clone(),
            raw_text: record.raw_text.clone(),
        }
    }
}
