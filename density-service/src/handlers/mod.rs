pub mod analysis;
pub mod health;
pub mod metrics;
pub mod reports;

pub use analysis::analyze_photo;
pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use reports::generate_report;
