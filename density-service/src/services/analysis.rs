use crate::analysis::{self, TrendReferences};
use crate::dtos::{AnalyzePhotoRequest, AnalyzePhotoResponse};
use crate::models::AnalysisRecord;
use crate::services::history::HistoryStore;
use crate::services::metrics::record_analysis;
use crate::services::storage::ImageStore;
use chrono::Utc;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Fetches a photo, measures it and records the result against the subject's history.
#[derive(Clone)]
pub struct AnalysisService {
    images: Arc<dyn ImageStore>,
    history: Arc<dyn HistoryStore>,
    max_image_bytes: usize,
}

impl AnalysisService {
    pub fn new(
        images: Arc<dyn ImageStore>,
        history: Arc<dyn HistoryStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            images,
            history,
            max_image_bytes,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(photo_id = %request.photo_id, preset = request.preset().as_str())
    )]
    pub async fn analyze_photo(
        &self,
        subject_id: &str,
        request: &AnalyzePhotoRequest,
    ) -> Result<AnalyzePhotoResponse, AppError> {
        let started = Instant::now();
        let preset = request.preset();

        let result = self.run(subject_id, request).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        record_analysis(preset.as_str(), outcome, started.elapsed());

        result
    }

    async fn run(
        &self,
        subject_id: &str,
        request: &AnalyzePhotoRequest,
    ) -> Result<AnalyzePhotoResponse, AppError> {
        let image_bytes = self.images.fetch(&request.storage_path).await?;
        if image_bytes.len() > self.max_image_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image is {} bytes, limit is {}",
                image_bytes.len(),
                self.max_image_bytes
            )));
        }

        let preset = request.preset();
        let result = tokio::task::spawn_blocking(move || analysis::analyze(&image_bytes, preset))
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Analysis task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!(error = %e, "Photo could not be analysed");
                AppError::BadRequest(anyhow::Error::new(e))
            })?;

        let now = Utc::now();
        let references = self.history.reference_points(subject_id, now).await?;
        let delta = TrendReferences::from_points(&references, now).compare(result.density_index);

        let record = AnalysisRecord::new(
            subject_id.to_string(),
            request.photo_id.clone(),
            request.captured_at.clone(),
            result,
            delta,
            now,
        );
        self.history.save_analysis(&record).await?;

        let warnings: Vec<&str> = record.quality.warnings.iter().map(|w| w.as_str()).collect();
        tracing::info!(
            subject_id = %subject_id,
            analysis_id = %record.id,
            density_index = record.density_index,
            delta_vs_prev = record.delta_vs_prev,
            delta_vs_base = record.delta_vs_base,
            quality_score = record.quality.score,
            warnings = ?warnings,
            "Photo analysed"
        );

        Ok(AnalyzePhotoResponse::from(&record))
    }
}
