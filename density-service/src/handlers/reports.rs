use crate::dtos::{ReportGenerateRequest, ReportGenerateResponse};
use crate::middleware::AuthenticatedSubject;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

pub async fn generate_report(
    State(state): State<AppState>,
    subject: AuthenticatedSubject,
    payload: Option<Json<ReportGenerateRequest>>,
) -> Result<Json<ReportGenerateResponse>, AppError> {
    // A missing or empty body asks for the default period
    let period_days = payload.and_then(|Json(body)| body.period_days);

    let report = state.reports.generate(&subject.0, period_days).await?;
    Ok(Json(ReportGenerateResponse::from(&report)))
}
