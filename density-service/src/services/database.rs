use crate::analysis::HistoricalDensityPoint;
use crate::models::{AnalysisRecord, ReportRecord};
use crate::services::history::{HistoryStore, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, Document},
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use serde::Deserialize;
use service_core::error::AppError;

const ANALYSES: &str = "analysis_results";
const REPORTS: &str = "reports";

/// Projection of an analysis record onto the fields trend comparison needs.
#[derive(Debug, Deserialize)]
struct PointDocument {
    #[serde(
        rename = "computedAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    computed_at: DateTime<Utc>,
    #[serde(rename = "densityIndex")]
    density_index: f64,
}

impl From<PointDocument> for HistoricalDensityPoint {
    fn from(doc: PointDocument) -> Self {
        HistoricalDensityPoint {
            computed_at: doc.computed_at,
            density_index: doc.density_index,
        }
    }
}

fn point_projection() -> Document {
    doc! { "_id": 0, "computedAt": 1, "densityIndex": 1 }
}

#[derive(Clone)]
pub struct MongoHistoryStore {
    client: MongoClient,
    db: Database,
}

impl MongoHistoryStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for density-service");

        let subject_time_index = IndexModel::builder()
            .keys(doc! { "subjectId": 1, "computedAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("subject_computed_at".to_string())
                    .build(),
            )
            .build();

        self.analyses()
            .create_index(subject_time_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create index on {}: {}", ANALYSES, e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on {}.(subjectId, computedAt)", ANALYSES);

        let report_index = IndexModel::builder()
            .keys(doc! { "subjectId": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("subject_created_at".to_string())
                    .build(),
            )
            .build();

        self.reports()
            .create_index(report_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create index on {}: {}", REPORTS, e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on {}.(subjectId, createdAt)", REPORTS);

        Ok(())
    }

    pub fn analyses(&self) -> Collection<AnalysisRecord> {
        self.db.collection(ANALYSES)
    }

    pub fn reports(&self) -> Collection<ReportRecord> {
        self.db.collection(REPORTS)
    }

    fn points(&self) -> Collection<PointDocument> {
        self.db.collection(ANALYSES)
    }
}

fn sort_direction(order: SortOrder) -> i32 {
    match order {
        SortOrder::LatestFirst => -1,
        SortOrder::EarliestFirst => 1,
    }
}

/// Latest point before the cutoff and earliest point, in one aggregation so both
/// ends observe the same data.
fn reference_pipeline(subject_id: &str, before: DateTime<Utc>) -> Vec<Document> {
    let cutoff = bson::DateTime::from_chrono(before);
    vec![
        doc! { "$match": { "subjectId": subject_id } },
        doc! { "$facet": {
            "latest": [
                { "$match": { "computedAt": { "$lt": cutoff } } },
                { "$sort": { "computedAt": -1 } },
                { "$limit": 1 },
                { "$project": point_projection() },
            ],
            "earliest": [
                { "$sort": { "computedAt": 1 } },
                { "$limit": 1 },
                { "$project": point_projection() },
            ],
        }},
    ]
}

fn decode_points(facet: &Document, key: &str) -> Result<Vec<HistoricalDensityPoint>, AppError> {
    let Ok(entries) = facet.get_array(key) else {
        return Ok(Vec::new());
    };

    entries
        .iter()
        .filter_map(|entry| entry.as_document())
        .map(|entry| {
            bson::from_document::<PointDocument>(entry.clone())
                .map(HistoricalDensityPoint::from)
                .map_err(|e| AppError::DatabaseError(anyhow::Error::new(e)))
        })
        .collect()
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn historical_points(
        &self,
        subject_id: &str,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "computedAt": sort_direction(order) })
            .limit(limit as i64)
            .projection(point_projection())
            .build();

        let cursor = self
            .points()
            .find(doc! { "subjectId": subject_id }, options)
            .await?;

        let points: Vec<PointDocument> = cursor.try_collect().await?;
        Ok(points.into_iter().map(HistoricalDensityPoint::from).collect())
    }

    async fn reference_points(
        &self,
        subject_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<HistoricalDensityPoint>, AppError> {
        let pipeline = reference_pipeline(subject_id, before);

        let mut cursor = self
            .db
            .collection::<Document>(ANALYSES)
            .aggregate(pipeline, None)
            .await?;
        let Some(facet) = cursor.try_next().await? else {
            return Ok(Vec::new());
        };

        let latest = decode_points(&facet, "latest")?;
        let earliest = decode_points(&facet, "earliest")?;

        let mut points = latest;
        for point in earliest {
            if !points.contains(&point) {
                points.push(point);
            }
        }
        Ok(points)
    }

    async fn save_analysis(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.analyses()
            .replace_one(
                doc! { "_id": record.id.as_str(), "subjectId": record.subject_id.as_str() },
                record,
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(analysis_id = %record.id, "Failed to save analysis: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn save_report(&self, record: &ReportRecord) -> Result<(), AppError> {
        self.reports().insert_one(record, None).await.map_err(|e| {
            tracing::error!(report_id = %record.id, "Failed to save report: {}", e);
            AppError::from(e)
        })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
