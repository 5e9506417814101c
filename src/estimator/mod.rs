//! Token estimators, one per geometric encoding policy.

pub mod anyres;
pub mod fixed_crop;
pub mod patch_merge;
pub mod tiled_canvas;

pub use anyres::{AnyResFlavor, AnyResGridEstimator};
pub use fixed_crop::FixedCropEstimator;
pub use patch_merge::{merged_token_count, PatchMergeEstimator};
pub use tiled_canvas::TiledCanvasEstimator;

use crate::cache::GeometryCache;
use crate::domain::{ImageSize, TokenEstimate};
use crate::error::Result;

/// A configured estimator. Built by [`crate::selector::select`] and reusable for any number of
/// images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEstimator {
    PatchMerge(PatchMergeEstimator),
    TiledCanvas(TiledCanvasEstimator),
    FixedCrop(FixedCropEstimator),
    AnyResGrid(AnyResGridEstimator),
}

impl TokenEstimator {
    pub fn name(&self) -> &'static str {
        match self {
            TokenEstimator::PatchMerge(_) => "patch_merge",
            TokenEstimator::TiledCanvas(_) => "tiled_canvas",
            TokenEstimator::FixedCrop(_) => "fixed_crop",
            TokenEstimator::AnyResGrid(est) => match est.flavor() {
                AnyResFlavor::Next => "any_res_grid (next)",
                AnyResFlavor::OneVision => "any_res_grid (onevision)",
            },
        }
    }

    /// Estimate without memoization.
    pub fn estimate(&self, image: ImageSize) -> Result<TokenEstimate> {
        self.estimate_with_cache(image, &GeometryCache::disabled())
    }

    /// Estimate, reusing geometry results from `cache`. The result is identical to [`Self::estimate`].
    pub fn estimate_with_cache(&self, image: ImageSize, cache: &GeometryCache) -> Result<TokenEstimate> {
        match self {
            TokenEstimator::PatchMerge(est) => est.estimate(image, cache),
            TokenEstimator::TiledCanvas(est) => est.estimate(image, cache),
            TokenEstimator::FixedCrop(est) => est.estimate(image),
            TokenEstimator::AnyResGrid(est) => est.estimate(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatchMergeConfig, TiledCanvasConfig};

    #[test]
    fn cached_and_uncached_estimates_agree() {
        let estimators = [
            TokenEstimator::PatchMerge(PatchMergeEstimator::new(PatchMergeConfig {
                patch_size: 14,
                merge_size: 2,
                min_pixels: 3136,
                max_pixels: 12_845_056,
            })),
            TokenEstimator::TiledCanvas(TiledCanvasEstimator::new(TiledCanvasConfig {
                tile_size: 448,
                min_tiles: 1,
                max_tiles: 12,
                patch_size: 14,
                pixel_unshuffle_factor: 2,
            })),
        ];
        let cache = GeometryCache::new();
        for estimator in &estimators {
            for (height, width) in [(800, 800), (1080, 1920), (800, 800), (37, 1234)] {
                let image = ImageSize::new(height, width).expect("size");
                assert_eq!(
                    estimator.estimate_with_cache(image, &cache),
                    estimator.estimate(image),
                    "{} {height}x{width}",
                    estimator.name()
                );
            }
        }
        assert!(cache.stats().iter().any(|s| s.hits > 0));
    }
}
