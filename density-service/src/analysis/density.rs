use image::{GrayImage, Luma, RgbImage, imageops};

/// Standard deviation, in pixels, of the smoothing applied before thresholding.
pub const BLUR_SIGMA: f32 = 2.0;

/// ITU-R BT.601 luma in 16.16 fixed point, rounded.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * 19_595 + u32::from(g) * 38_470 + u32::from(b) * 7_471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Converts a region to grayscale and smooths it. The result feeds both the
/// quality assessment and the density threshold.
pub fn prepare_grayscale(region: &RgbImage) -> GrayImage {
    let gray = GrayImage::from_fn(region.width(), region.height(), |x, y| {
        let [r, g, b] = region.get_pixel(x, y).0;
        Luma([luma(r, g, b)])
    });
    imageops::blur(&gray, BLUR_SIGMA)
}

/// Median intensity, averaging the two middle values for an even pixel count and
/// truncating. Returns 0 for an empty image.
pub fn median_intensity(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for &value in gray.as_raw() {
        histogram[usize::from(value)] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    // Zero-based ranks of the middle element(s).
    let upper_rank = total / 2;
    let lower_rank = if total % 2 == 0 { upper_rank - 1 } else { upper_rank };

    let value_at = |rank: u64| -> u16 {
        let mut seen = 0u64;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen > rank {
                return value as u16;
            }
        }
        255
    };

    ((value_at(lower_rank) + value_at(upper_rank)) / 2) as u8
}

/// Share of pixels strictly darker than the median of an already prepared plane.
pub fn density_from_prepared(gray: &GrayImage) -> f64 {
    let total = gray.as_raw().len();
    if total == 0 {
        return 0.0;
    }

    let threshold = median_intensity(gray);
    let hair_pixels = gray.as_raw().iter().filter(|&&v| v < threshold).count();
    hair_pixels as f64 / total as f64
}

/// Density index of an RGB region: grayscale, blur, then median threshold.
pub fn estimate_density(region: &RgbImage) -> f64 {
    density_from_prepared(&prepare_grayscale(region))
}
