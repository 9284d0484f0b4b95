use super::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Named framing presets for the region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Shifted up to frame the crown of the head.
    Crown,
    #[default]
    Default,
}

impl Preset {
    /// Resolves a client supplied preset name. Unknown or missing names use
    /// [`Preset::Default`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("crown") => Preset::Crown,
            _ => Preset::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Crown => "crown",
            Preset::Default => "default",
        }
    }

    /// Top edge of the region as a fraction of the image height.
    fn top_fraction(&self) -> f64 {
        match self {
            Preset::Crown => 0.15,
            Preset::Default => 0.2,
        }
    }
}

const LEFT_FRACTION: f64 = 0.2;
const EXTENT_FRACTION: f64 = 0.6;

/// Pixel rectangle inside an image. Always non-empty and fully contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Resolution independent form of a [`RegionDescriptor`], each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRegion {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RegionDescriptor {
    pub fn normalized(&self, image_width: u32, image_height: u32) -> NormalizedRegion {
        let iw = f64::from(image_width);
        let ih = f64::from(image_height);
        NormalizedRegion {
            x: f64::from(self.x) / iw,
            y: f64::from(self.y) / ih,
            w: f64::from(self.width) / iw,
            h: f64::from(self.height) / ih,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Truncates `fraction * extent` toward zero.
fn scaled(extent: u32, fraction: f64) -> u32 {
    (f64::from(extent) * fraction) as u32
}

/// Selects the analysis rectangle for an image of `width x height` pixels.
///
/// Offsets and extents are truncated toward zero. On images one pixel wide or tall
/// the extent along that axis is raised to one pixel so the region is never empty.
pub fn select_region(
    height: u32,
    width: u32,
    preset: Preset,
) -> Result<RegionDescriptor, AnalysisError> {
    if width == 0 || height == 0 {
        return Err(AnalysisError::InvalidDimensions { width, height });
    }

    Ok(RegionDescriptor {
        x: scaled(width, LEFT_FRACTION),
        y: scaled(height, preset.top_fraction()),
        width: scaled(width, EXTENT_FRACTION).max(1),
        height: scaled(height, EXTENT_FRACTION).max(1),
    })
}
