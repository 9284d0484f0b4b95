use crate::analysis::{
    DensityResult, HistoricalDensityPoint, METHOD_TAG, NormalizedRegion, QualityInfo, TrendDelta,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored result of analysing one photo. Field names are the persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject_id: String,
    pub photo_id: String,
    pub captured_at: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub computed_at: DateTime<Utc>,
    pub roi: NormalizedRegion,
    pub density_index: f64,
    pub delta_vs_prev: f64,
    pub delta_vs_base: f64,
    pub quality: QualityInfo,
    pub method: String,
}

impl AnalysisRecord {
    /// One record per subject and photo: re-analysing a photo reuses its id, while
    /// another subject's photo with the same id keeps its own record.
    pub fn id_for_photo(subject_id: &str, photo_id: &str) -> String {
        format!("{}/analysis_{}", subject_id, photo_id)
    }

    pub fn new(
        subject_id: String,
        photo_id: String,
        captured_at: Option<String>,
        result: DensityResult,
        delta: TrendDelta,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::id_for_photo(&subject_id, &photo_id),
            subject_id,
            photo_id,
            captured_at,
            computed_at,
            roi: result.roi,
            density_index: result.density_index,
            delta_vs_prev: delta.delta_vs_prev,
            delta_vs_base: delta.delta_vs_base,
            quality: result.quality,
            method: METHOD_TAG.to_string(),
        }
    }

    pub fn point(&self) -> HistoricalDensityPoint {
        HistoricalDensityPoint {
            computed_at: self.computed_at,
            density_index: self.density_index,
        }
    }
}
