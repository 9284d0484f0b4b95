pub mod analysis;
pub mod report;

pub use analysis::AnalysisRecord;
pub use report::{ReportPeriod, ReportRecord};
