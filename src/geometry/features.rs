//! Feature-map trimming after a letterboxed tile canvas is unpadded.

/// Downsampling kicks in once the trimmed canvas exceeds the cap by more than this factor.
const CAP_TOLERANCE: f64 = 1.1;

/// Decimal digits kept before truncating the rescaled side. Keeps products such as
/// `335.99999999` from collapsing to 335.
const ROUNDING_DIGITS: i32 = 7;

/// Count the features left after removing letterbox padding from a tiled canvas.
///
/// The virtual canvas is `patches_height * scale_height` by `patches_width * scale_width`
/// feature cells. The axis over-allocated relative to the original aspect ratio loses its
/// symmetric padding. Returns `(unpadded_features, newline_features)`, where the newline count is
/// one separator per remaining row.
///
/// With `max_patches_cap`, a canvas larger than `cap * patches_height²` by more than 10% is scaled
/// down on both axes (the `anyres_max` path).
pub fn get_unpadded_features(
    height: u32,
    width: u32,
    patches_height: u32,
    patches_width: u32,
    scale_height: u32,
    scale_width: u32,
    max_patches_cap: Option<u32>,
) -> (u64, u64) {
    let mut current_height = i64::from(patches_height) * i64::from(scale_height);
    let mut current_width = i64::from(patches_width) * i64::from(scale_width);
    if current_height == 0 || current_width == 0 || height == 0 || width == 0 {
        return (0, 0);
    }

    let original_aspect_ratio = f64::from(width) / f64::from(height);
    let current_aspect_ratio = current_width as f64 / current_height as f64;

    if original_aspect_ratio > current_aspect_ratio {
        let scaled = f64::from(height) * (current_width as f64 / f64::from(width));
        let new_height = round_decimals(scaled, ROUNDING_DIGITS) as i64;
        let padding = (current_height - new_height).div_euclid(2);
        current_height -= padding * 2;
    } else {
        let scaled = f64::from(width) * (current_height as f64 / f64::from(height));
        let new_width = round_decimals(scaled, ROUNDING_DIGITS) as i64;
        let padding = (current_width - new_width).div_euclid(2);
        current_width -= padding * 2;
    }

    let mut unpadded_features = current_height * current_width;
    let mut newline_features = current_height;

    if let Some(cap) = max_patches_cap {
        let budget = f64::from(cap) * f64::from(patches_height).powi(2);
        let ratio = ((current_height * current_width) as f64 / budget).sqrt();
        if ratio > CAP_TOLERANCE {
            let downsampled_height = (current_height as f64 / ratio).floor() as i64;
            let downsampled_width = (current_width as f64 / ratio).floor() as i64;
            unpadded_features = downsampled_height * downsampled_width;
            newline_features = downsampled_height;
        }
    }

    (unpadded_features.max(0) as u64, newline_features.max(0) as u64)
}

/// Round half to even at `digits` decimal places.
pub(crate) fn round_decimals(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}
