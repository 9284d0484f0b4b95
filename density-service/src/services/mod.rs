pub mod analysis;
pub mod database;
pub mod history;
pub mod identity;
pub mod metrics;
pub mod report;
pub mod storage;

pub use analysis::AnalysisService;
pub use database::MongoHistoryStore;
pub use history::{HistoryStore, InMemoryHistoryStore, SortOrder};
pub use identity::{DenyAllVerifier, IdentityVerifier, JwtVerifier, StaticTokenVerifier};
pub use metrics::{get_metrics, init_metrics};
pub use report::ReportService;
pub use storage::{ImageStore, InMemoryImageStore, LocalImageStore, StorageError};
