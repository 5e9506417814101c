//! Aspect-preserving resize onto a `factor`-aligned grid under a pixel budget.

use crate::domain::ImageSize;
use crate::error::{EstimateError, Result};

/// Inputs whose long/short side ratio exceeds this are rejected.
pub const MAX_ASPECT_RATIO: f64 = 200.0;

/// Default Qwen factor (`patch_size 14 * merge_size 2`).
pub const DEFAULT_FACTOR: u32 = 28;

/// Rescale `(height, width)` so both sides are multiples of `factor` and the area lands in
/// `[min_pixels, max_pixels]`, keeping the aspect ratio as close as the grid allows.
///
/// Each side is first rounded (half to even) to the nearest multiple. An oversized result is
/// shrunk by `sqrt(area / max_pixels)` and floored, never below one `factor`; an undersized one
/// is grown by `sqrt(min_pixels / area)` and ceiled.
pub fn resize_to_multiple(
    height: u32,
    width: u32,
    factor: u32,
    min_pixels: u64,
    max_pixels: u64,
) -> Result<(u32, u32)> {
    let size = ImageSize::new(height, width)?;
    if factor == 0 {
        return Err(EstimateError::invalid_config("factor", "must be positive"));
    }

    let ratio = size.absolute_aspect_ratio();
    if ratio > MAX_ASPECT_RATIO {
        return Err(EstimateError::AspectRatioTooExtreme { ratio, max: MAX_ASPECT_RATIO });
    }

    let h = f64::from(height);
    let w = f64::from(width);
    let f = f64::from(factor);
    let factor_u64 = u64::from(factor);

    let mut h_bar = (h / f).round_ties_even() as u64 * factor_u64;
    let mut w_bar = (w / f).round_ties_even() as u64 * factor_u64;

    if h_bar * w_bar > max_pixels {
        let beta = (h * w / max_pixels as f64).sqrt();
        h_bar = factor_u64.max((h / beta / f).floor() as u64 * factor_u64);
        w_bar = factor_u64.max((w / beta / f).floor() as u64 * factor_u64);
    } else if h_bar * w_bar < min_pixels {
        let beta = (min_pixels as f64 / (h * w)).sqrt();
        h_bar = (h * beta / f).ceil() as u64 * factor_u64;
        w_bar = (w * beta / f).ceil() as u64 * factor_u64;
    }

    // Only reachable with `min_pixels == 0`; a positive floor always takes the grow branch.
    h_bar = h_bar.max(factor_u64);
    w_bar = w_bar.max(factor_u64);

    Ok((to_dimension(h_bar)?, to_dimension(w_bar)?))
}

fn to_dimension(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        EstimateError::invalid_config("min_pixels", format!("resized side {value} overflows u32"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QWEN_MIN: u64 = 3136;
    const QWEN_MAX: u64 = 12_845_056;

    #[test]
    fn rounds_to_nearest_multiple_within_budget() {
        assert_eq!(resize_to_multiple(1080, 1920, 28, QWEN_MIN, QWEN_MAX), Ok((1092, 1932)));
        assert_eq!(resize_to_multiple(800, 800, 28, QWEN_MIN, QWEN_MAX), Ok((812, 812)));
        assert_eq!(resize_to_multiple(256, 256, 28, QWEN_MIN, QWEN_MAX), Ok((252, 252)));
    }

    #[test]
    fn halfway_values_round_to_even_multiple() {
        // 70 / 28 = 2.5 and 126 / 28 = 4.5 both round down to the even neighbour.
        assert_eq!(resize_to_multiple(70, 126, 28, 0, 1_000_000_000), Ok((56, 112)));
        assert_eq!(resize_to_multiple(42, 42, 28, 0, 1_000_000_000), Ok((56, 56)));
    }

    #[test]
    fn shrinks_when_over_max_pixels() {
        let (h, w) = resize_to_multiple(1080, 1920, 28, QWEN_MIN, 1_003_520).expect("resize");
        assert_eq!((h, w), (728, 1316));
        assert!(u64::from(h) * u64::from(w) <= 1_003_520);

        assert_eq!(resize_to_multiple(2000, 3000, 28, QWEN_MIN, 1_003_520), Ok((812, 1204)));
        assert_eq!(resize_to_multiple(1000, 1000, 28, QWEN_MIN, 200_704), Ok((448, 448)));
    }

    #[test]
    fn grows_when_under_min_pixels() {
        assert_eq!(resize_to_multiple(10, 10, 28, QWEN_MIN, QWEN_MAX), Ok((56, 56)));
        assert_eq!(resize_to_multiple(4, 100, 28, QWEN_MIN, QWEN_MAX), Ok((28, 280)));
        // Rounds to a zero-height grid first, then grows back to one factor unit.
        assert_eq!(resize_to_multiple(3, 500, 28, QWEN_MIN, QWEN_MAX), Ok((28, 728)));
    }

    #[test]
    fn zero_min_pixels_keeps_one_factor_unit() {
        assert_eq!(resize_to_multiple(10, 10, 28, 0, QWEN_MAX), Ok((28, 28)));
        assert_eq!(resize_to_multiple(10, 1000, 28, 0, QWEN_MAX), Ok((28, 1008)));
        assert_eq!(resize_to_multiple(1080, 1920, 28, 0, QWEN_MAX), Ok((1092, 1932)));
    }

    #[test]
    fn outputs_are_positive_multiples_in_budget() {
        let sizes = [(1, 1), (17, 33), (480, 640), (1080, 1920), (4000, 3000), (50, 9000)];
        for (h, w) in sizes {
            let (rh, rw) = resize_to_multiple(h, w, 28, QWEN_MIN, QWEN_MAX).expect("resize");
            assert!(rh > 0 && rw > 0, "{h}x{w} -> {rh}x{rw}");
            assert_eq!(rh % 28, 0);
            assert_eq!(rw % 28, 0);
            let area = u64::from(rh) * u64::from(rw);
            assert!((QWEN_MIN..=QWEN_MAX).contains(&area), "{h}x{w} -> area {area}");
        }
    }

    #[test]
    fn rejects_extreme_aspect_ratio() {
        let err = resize_to_multiple(1, 300, DEFAULT_FACTOR, QWEN_MIN, QWEN_MAX).unwrap_err();
        assert!(matches!(err, EstimateError::AspectRatioTooExtreme { ratio, .. } if ratio == 300.0));

        // Exactly 200:1 is still accepted.
        assert_eq!(resize_to_multiple(1, 200, 28, QWEN_MIN, QWEN_MAX), Ok((28, 812)));
    }

    #[test]
    fn rejects_zero_inputs() {
        assert!(matches!(
            resize_to_multiple(0, 10, 28, 0, 100),
            Err(EstimateError::InvalidImageSize { .. })
        ));
        assert!(matches!(
            resize_to_multiple(10, 10, 0, 0, 100),
            Err(EstimateError::InvalidConfig { field: "factor", .. })
        ));
    }
}
