pub mod analysis;
pub mod reports;

pub use analysis::{AnalyzePhotoRequest, AnalyzePhotoResponse};
pub use reports::{ReportGenerateRequest, ReportGenerateResponse};
