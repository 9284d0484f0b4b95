use image::GrayImage;
use serde::{Deserialize, Serialize};

const LOW_LIGHT_BELOW: f64 = 70.0;
const OVEREXPOSED_ABOVE: f64 = 200.0;
const BLUR_BELOW: f64 = 80.0;
const PENALTY_PER_WARNING: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityWarning {
    LowLight,
    Overexposed,
    Blur,
}

impl QualityWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityWarning::LowLight => "low_light",
            QualityWarning::Overexposed => "overexposed",
            QualityWarning::Blur => "blur",
        }
    }
}

/// Capture quality of an analysed region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityInfo {
    /// `1.0` minus `0.2` per warning, floored at zero.
    pub score: f64,
    /// Flagged conditions in the fixed order low light, overexposed, blur.
    pub warnings: Vec<QualityWarning>,
}

impl QualityInfo {
    fn from_warnings(warnings: Vec<QualityWarning>) -> Self {
        let score = (1.0 - PENALTY_PER_WARNING * warnings.len() as f64).max(0.0);
        Self { score, warnings }
    }
}

/// Running sums for a population variance.
#[derive(Default)]
struct Moments {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Zero when no samples were pushed.
    fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0)
    }
}

fn mean_brightness(gray: &GrayImage) -> f64 {
    let total = u64::from(gray.width()) * u64::from(gray.height());
    if total == 0 {
        return 0.0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| u64::from(v)).sum();
    sum as f64 / total as f64
}

/// Sum of the variances of horizontal and vertical neighbour differences.
/// An axis with a single pixel contributes nothing.
fn sharpness(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let mut horizontal = Moments::default();
    let mut vertical = Moments::default();

    for y in 0..height {
        for x in 0..width {
            let value = f64::from(gray.get_pixel(x, y)[0]);
            if x > 0 {
                horizontal.push(value - f64::from(gray.get_pixel(x - 1, y)[0]));
            }
            if y > 0 {
                vertical.push(value - f64::from(gray.get_pixel(x, y - 1)[0]));
            }
        }
    }

    horizontal.variance() + vertical.variance()
}

/// Scores lighting and sharpness of a grayscale region.
pub fn assess_quality(gray: &GrayImage) -> QualityInfo {
    let brightness = mean_brightness(gray);
    let sharpness = sharpness(gray);

    let mut warnings = Vec::new();
    if brightness < LOW_LIGHT_BELOW {
        warnings.push(QualityWarning::LowLight);
    }
    if brightness > OVEREXPOSED_ABOVE {
        warnings.push(QualityWarning::Overexposed);
    }
    if sharpness < BLUR_BELOW {
        warnings.push(QualityWarning::Blur);
    }

    tracing::trace!(brightness, sharpness, ?warnings, "Assessed region quality");
    QualityInfo::from_warnings(warnings)
}
