use super::density::{density_from_prepared, prepare_grayscale};
use super::error::AnalysisError;
use super::quality::{QualityInfo, assess_quality};
use super::region::{NormalizedRegion, Preset, select_region};
use image::imageops;

/// Outcome of one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityResult {
    pub density_index: f64,
    pub quality: QualityInfo,
    pub roi: NormalizedRegion,
}

/// Decodes `image_bytes` and measures the density index of the preset region.
///
/// Any failure aborts the whole call; there is no partial result.
#[tracing::instrument(skip(image_bytes), fields(bytes = image_bytes.len()))]
pub fn analyze(image_bytes: &[u8], preset: Preset) -> Result<DensityResult, AnalysisError> {
    let rgb = image::load_from_memory(image_bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let region = select_region(height, width, preset)?;
    let cropped =
        imageops::crop_imm(&rgb, region.x, region.y, region.width, region.height).to_image();

    let prepared = prepare_grayscale(&cropped);
    let quality = assess_quality(&prepared);
    let density_index = density_from_prepared(&prepared);

    tracing::debug!(
        width,
        height,
        density_index,
        quality_score = quality.score,
        "Density analysis completed"
    );

    Ok(DensityResult {
        density_index,
        quality,
        roi: region.normalized(width, height),
    })
}
