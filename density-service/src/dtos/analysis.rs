use crate::analysis::{NormalizedRegion, Preset, QualityInfo};
use crate::models::AnalysisRecord;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePhotoRequest {
    #[validate(length(min = 1, max = 256))]
    pub photo_id: String,
    #[validate(length(min = 1, max = 1024))]
    pub storage_path: String,
    pub captured_at: Option<String>,
    pub roi_preset: Option<String>,
}

impl AnalyzePhotoRequest {
    pub fn preset(&self) -> Preset {
        Preset::from_name(self.roi_preset.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePhotoResponse {
    pub analysis_id: String,
    pub density_index: f64,
    pub delta_vs_prev: f64,
    pub delta_vs_base: f64,
    pub quality: QualityInfo,
    pub roi: NormalizedRegion,
    pub method: String,
}

impl From<&AnalysisRecord> for AnalyzePhotoResponse {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            analysis_id: record.id.clone(),
            density_index: record.density_index,
            delta_vs_prev: record.delta_vs_prev,
            delta_vs_base: record.delta_vs_base,
            quality: record.quality.clone(),
            roi: record.roi,
            method: record.method.clone(),
        }
    }
}
