//! Photo-based hair density estimation.
//!
//! The pipeline selects a region of interest, converts it to a blurred grayscale
//! plane, scores its capture quality and measures the share of pixels darker than
//! the region's median. [`trend`] compares a new measurement against the stored
//! history of the same subject.

mod density;
mod error;
mod pipeline;
mod quality;
mod region;
mod trend;

pub use density::{density_from_prepared, estimate_density, median_intensity, prepare_grayscale};
pub use error::AnalysisError;
pub use pipeline::{DensityResult, analyze};
pub use quality::{QualityInfo, QualityWarning, assess_quality};
pub use region::{NormalizedRegion, Preset, RegionDescriptor, select_region};
pub use trend::{HistoricalDensityPoint, TrendDelta, TrendReferences, compare};

/// Version tag persisted with every result. Bump it whenever the grayscale,
/// blur or thresholding steps change so stored generations can be told apart.
pub const METHOD_TAG: &str = "median_threshold_v1";
