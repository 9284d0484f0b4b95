use thiserror::Error;

/// Failures of the density pipeline. All of them are caused by the supplied image.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid image data: {source}")]
    InvalidImage {
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl From<image::ImageError> for AnalysisError {
    fn from(source: image::ImageError) -> Self {
        AnalysisError::InvalidImage { source }
    }
}
