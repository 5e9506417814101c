//! Best-resolution selection and letterbox placement for any-resolution grids.

use crate::domain::ImageSize;
use crate::error::{EstimateError, Result};

/// Pick the candidate canvas that keeps the most of the original resolution.
///
/// Effective resolution is the original area after a uniform downscale-to-fit (truncated to whole
/// pixels), capped at the original area. Higher effective resolution wins, then lower wasted area
/// (`candidate area - effective`), then the earliest candidate.
pub fn select_best_resolution(original: ImageSize, candidates: &[ImageSize]) -> Result<ImageSize> {
    let original_height = f64::from(original.height);
    let original_width = f64::from(original.width);

    let mut best_fit = None;
    let mut max_effective = 0u64;
    // None stands for "no waste recorded yet", i.e. infinity.
    let mut min_wasted: Option<u64> = None;

    for &candidate in candidates {
        let scale = (f64::from(candidate.width) / original_width)
            .min(f64::from(candidate.height) / original_height);
        let downscaled_width = (original_width * scale) as u64;
        let downscaled_height = (original_height * scale) as u64;

        let effective = (downscaled_width * downscaled_height).min(original.area());
        let wasted = candidate.area().saturating_sub(effective);

        let better_waste = min_wasted.map_or(true, |current| wasted < current);
        if effective > max_effective || (effective == max_effective && better_waste) {
            max_effective = effective;
            min_wasted = Some(wasted);
            best_fit = Some(candidate);
        }
    }

    best_fit.ok_or(EstimateError::EmptyCandidateList { what: "grid_pinpoints" })
}

/// Size of `image` after a uniform scale-to-fit into `target`.
///
/// The constraining axis takes the target value exactly; the other one is ceiled but never
/// exceeds its target side.
pub fn get_patch_output_size(image: ImageSize, target: ImageSize) -> ImageSize {
    let original_height = f64::from(image.height);
    let original_width = f64::from(image.width);

    let scale_w = f64::from(target.width) / original_width;
    let scale_h = f64::from(target.height) / original_height;

    if scale_w < scale_h {
        let new_height = ((original_height * scale_w).ceil() as u32).min(target.height);
        ImageSize { height: new_height, width: target.width }
    } else {
        let new_width = ((original_width * scale_h).ceil() as u32).min(target.width);
        ImageSize { height: target.height, width: new_width }
    }
}

/// Padding `((top, bottom), (left, right))` that centres `resized` inside `target`.
///
/// Odd slack goes to the bottom / right.
pub fn get_padding_size(resized: ImageSize, target: ImageSize) -> Result<((u32, u32), (u32, u32))> {
    if resized.height > target.height || resized.width > target.width {
        return Err(EstimateError::PaddingOverflow { resized, target });
    }

    let slack_y = target.height - resized.height;
    let slack_x = target.width - resized.width;
    let (top, r_y) = (slack_y / 2, slack_y % 2);
    let (left, r_x) = (slack_x / 2, slack_x % 2);

    Ok(((top, top + r_y), (left, left + r_x)))
}
