use crate::dtos::{AnalyzePhotoRequest, AnalyzePhotoResponse};
use crate::middleware::AuthenticatedSubject;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

pub async fn analyze_photo(
    State(state): State<AppState>,
    subject: AuthenticatedSubject,
    Json(payload): Json<AnalyzePhotoRequest>,
) -> Result<Json<AnalyzePhotoResponse>, AppError> {
    payload.validate()?;

    let response = state.analysis.analyze_photo(&subject.0, &payload).await?;
    Ok(Json(response))
}
