use crate::analysis::HistoricalDensityPoint;
use crate::models::{AnalysisRecord, ReportRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    LatestFirst,
    EarliestFirst,
}

/// Durable store of analysis results and reports, keyed by subject.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `limit` points of one subject ordered by `computed_at`.
    async fn historical_points(
        &self,
        subject_id: &str,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError>;

    /// The latest point computed strictly before `before` and the earliest point of
    /// a subject, taken from a single read. Returns at most two points; one when
    /// both are the same entry.
    async fn reference_points(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError>;

    /// Inserts the record or replaces the one with the same subject and id.
    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), AppError>;

    async fn save_report(&self, record: &ReportRecord) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
struct Collections {
    /// Keyed by `(subject_id, id)`.
    analyses: HashMap<(String, String), AnalysisRecord>,
    reports: Vec<ReportRecord>,
}

impl Collections {
    fn sorted_points(&self, subject_id: &str, order: SortOrder) -> Vec<HistoricalDensityPoint> {
        let mut points: Vec<_> = self
            .analyses
            .values()
            .filter(|r| r.subject_id == subject_id)
            .map(AnalysisRecord::point)
            .collect();
        points.sort_by_key(|p| p.computed_at);
        if order == SortOrder::LatestFirst {
            points.reverse();
        }
        points
    }
}

/// History kept in process memory; every operation runs under one lock.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn analyses(&self, subject_id: &str) -> Vec<AnalysisRecord> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner
            .analyses
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.computed_at);
        records
    }

    pub async fn reports(&self, subject_id: &str) -> Vec<ReportRecord> {
        self.inner
            .read()
            .await
            .reports
            .iter()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn historical_points(
        &self,
        subject_id: &str,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError> {
        let mut points = self.inner.read().await.sorted_points(subject_id, order);
        points.truncate(limit);
        Ok(points)
    }

    async fn reference_points(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError> {
        let points = self
            .inner
            .read()
            .await
            .sorted_points(subject_id, SortOrder::EarliestFirst);

        let earliest = points.first().copied();
        let latest_before = points.iter().rev().find(|p| p.computed_at < before).copied();

        Ok(match (latest_before, earliest) {
            (Some(latest), Some(earliest)) if latest == earliest => vec![latest],
            (latest, earliest) => latest.into_iter().chain(earliest).collect(),
        })
    }

    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .analyses
            .insert((record.subject_id.clone(), record.id.clone()), record.clone());
        Ok(())
    }

    async fn save_report(&self, record: &ReportRecord) -> Result<(), AppError> {
        self.inner.write().await.reports.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        DensityResult, NormalizedRegion, QualityInfo, TrendDelta, TrendReferences,
    };
    use chrono::Duration;

    fn record(subject: &str, photo: &str, density: f64, at: DateTime<Utc>) -> AnalysisRecord {
        AnalysisRecord::new(
            subject.to_string(),
            photo.to_string(),
            None,
            DensityResult {
                density_index: density,
                quality: QualityInfo {
                    score: 1.0,
                    warnings: vec![],
                },
                roi: NormalizedRegion {
                    x: 0.2,
                    y: 0.2,
                    w: 0.6,
                    h: 0.6,
                },
            },
            TrendDelta::default(),
            at,
        )
    }

    async fn seeded() -> (InMemoryHistoryStore, DateTime<Utc>) {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        for (i, density) in [0.30, 0.32, 0.35].iter().enumerate() {
            let at = now - Duration::days(10 - i as i64);
            store
                .save_analysis(&record("u1", &format!("p{}", i), *density, at))
                .await
                .unwrap();
        }
        store
            .save_analysis(&record("u2", "other", 0.9, now))
            .await
            .unwrap();
        (store, now)
    }

    #[tokio::test]
    async fn test_points_in_both_orders_with_limit() {
        let (store, _) = seeded().await;

        let latest = store
            .historical_points("u1", SortOrder::LatestFirst, 2)
            .await
            .unwrap();
        assert_eq!(
            latest.iter().map(|p| p.density_index).collect::<Vec<_>>(),
            vec![0.35, 0.32]
        );

        let earliest = store
            .historical_points("u1", SortOrder::EarliestFirst, 10)
            .await
            .unwrap();
        assert_eq!(earliest.len(), 3);
        assert_eq!(earliest[0].density_index, 0.30);
    }

    #[tokio::test]
    async fn test_reference_points() {
        let (store, now) = seeded().await;
        let refs = store.reference_points("u1", now).await.unwrap();
        assert_eq!(
            refs.iter().map(|p| p.density_index).collect::<Vec<_>>(),
            vec![0.35, 0.30]
        );

        // u2's only point sits exactly at `now`, so it is a baseline but not a previous
        let single = store.reference_points("u2", now).await.unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].density_index, 0.9);

        assert!(store
            .reference_points("nobody", now)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_reference_points_skip_points_not_before_cutoff() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        for (photo, density, offset) in [
            ("early", 0.10, -5),
            ("middle", 0.40, -3),
            ("ahead", 0.90, 1),
        ] {
            store
                .save_analysis(&record("u1", photo, density, now + Duration::days(offset)))
                .await
                .unwrap();
        }

        let refs = store.reference_points("u1", now).await.unwrap();
        let references = TrendReferences::from_points(&refs, now);

        assert_eq!(references.previous, Some(0.40));
        assert_eq!(references.baseline, Some(0.10));
    }

    #[tokio::test]
    async fn test_same_photo_id_is_kept_per_subject() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        store
            .save_analysis(&record("u1", "shared", 0.30, now))
            .await
            .unwrap();
        store
            .save_analysis(&record("u2", "shared", 0.60, now))
            .await
            .unwrap();

        let u1 = store.analyses("u1").await;
        let u2 = store.analyses("u2").await;
        assert_eq!(u1.len(), 1);
        assert_eq!(u2.len(), 1);
        assert_eq!(u1[0].density_index, 0.30);
        assert_ne!(u1[0].id, u2[0].id);
    }

    #[tokio::test]
    async fn test_save_analysis_replaces_same_photo() {
        let (store, now) = seeded().await;
        store
            .save_analysis(&record("u1", "p2", 0.50, now))
            .await
            .unwrap();

        let records = store.analyses("u1").await;
        assert_eq!(records.len(), 3);
        assert_eq!(records.last().unwrap().density_index, 0.50);
    }
}
