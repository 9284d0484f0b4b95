use crate::analysis::HistoricalDensityPoint;
use crate::models::{ReportPeriod, ReportRecord};
use crate::services::history::{HistoryStore, SortOrder};
use crate::services::metrics::record_report;
use chrono::{DateTime, Duration, Utc};
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PERIOD_DAYS: i64 = 7;
pub const MAX_PERIOD_DAYS: i64 = 30;
/// Upper bound on the history read for one report.
const HISTORY_LIMIT: usize = 50;
pub const REPORT_MODEL: &str = "rule_based_v1";

/// Summary text derived from a window of measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub highlights: Vec<String>,
    pub next_actions: Vec<String>,
}

impl ReportSummary {
    pub fn raw_text(&self) -> String {
        let mut lines: Vec<&str> = self.highlights.iter().map(String::as_str).collect();
        lines.push("---");
        lines.extend(self.next_actions.iter().map(String::as_str));
        lines.join("\n")
    }
}

pub fn clamp_period(period_days: Option<i64>) -> i64 {
    period_days
        .unwrap_or(DEFAULT_PERIOD_DAYS)
        .clamp(1, MAX_PERIOD_DAYS)
}

/// Builds highlights and next actions from points sorted oldest first.
pub fn summarize(points: &[HistoricalDensityPoint], days: i64) -> ReportSummary {
    let (Some(first), Some(latest)) = (points.first(), points.last()) else {
        return ReportSummary {
            highlights: vec!["No measurements were recorded in this period.".to_string()],
            next_actions: vec![
                "Keep a weekly photo check-in so changes can be tracked.".to_string(),
                "Photograph under the same lighting and distance each time.".to_string(),
            ],
        };
    };

    let change = latest.density_index - first.density_index;
    let trend = if change < 0.0 {
        "Density dipped; re-check capture conditions before drawing conclusions."
    } else {
        "Density is holding steady; the routine is working."
    };

    ReportSummary {
        highlights: vec![
            format!(
                "Over {} days the density index was {:.3} (change {:+.3}).",
                days, latest.density_index, change
            ),
            trend.to_string(),
        ],
        next_actions: vec![
            "Capture the next photo under the same conditions for a fair comparison.".to_string(),
            "Get enough sleep and keep protein in your meals.".to_string(),
        ],
    }
}

/// Generates and stores habit reports from a subject's recent history.
#[derive(Clone)]
pub struct ReportService {
    history: Arc<dyn HistoryStore>,
}

impl ReportService {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    pub async fn generate(
        &self,
        subject_id: &str,
        period_days: Option<i64>,
    ) -> Result<ReportRecord, AppError> {
        self.generate_at(subject_id, period_days, Utc::now()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn generate_at(
        &self,
        subject_id: &str,
        period_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<ReportRecord, AppError> {
        let days = clamp_period(period_days);
        let cutoff = now - Duration::days(days);

        let mut points: Vec<_> = self
            .history
            .historical_points(subject_id, SortOrder::LatestFirst, HISTORY_LIMIT)
            .await?
            .into_iter()
            .filter(|p| p.computed_at >= cutoff)
            .collect();
        points.sort_by_key(|p| p.computed_at);

        let summary = summarize(&points, days);
        let record = ReportRecord {
            id: format!("report_{}", Uuid::new_v4().simple()),
            subject_id: subject_id.to_string(),
            created_at: now,
            period: ReportPeriod {
                from: cutoff.date_naive().to_string(),
                to: now.date_naive().to_string(),
                days,
            },
            raw_text: summary.raw_text(),
            highlights: summary.highlights,
            next_actions: summary.next_actions,
            model: REPORT_MODEL.to_string(),
        };

        self.history.save_report(&record).await?;
        record_report(points.len());
        tracing::info!(
            subject_id = %subject_id,
            report_id = %record.id,
            entries = points.len(),
            "Report generated"
        );

        Ok(record)
    }
}
