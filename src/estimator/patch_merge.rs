//! Qwen2-VL / Qwen2.5-VL: resize onto a merge-aligned grid, patchify, pool `merge²` patches.

use tracing::debug;

use crate::cache::GeometryCache;
use crate::domain::{ImageSize, PatchMergeConfig, TileGrid, TokenEstimate};
use crate::error::{EstimateError, Result};

/// Tokens emitted after pooling `merge_size²` patches into one. Remainder patches are dropped.
pub fn merged_token_count(patch_count: u64, merge_size: u32) -> u64 {
    patch_count / u64::from(merge_size).pow(2)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchMergeEstimator {
    config: PatchMergeConfig,
}

impl PatchMergeEstimator {
    pub fn new(config: PatchMergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatchMergeConfig {
        &self.config
    }

    /// Side of one merged token in pixels, `patch_size * merge_size`.
    pub fn factor(&self) -> Result<u32> {
        let PatchMergeConfig { patch_size, merge_size, .. } = self.config;
        patch_size.checked_mul(merge_size).ok_or_else(|| {
            EstimateError::invalid_config(
                "merge_size",
                format!("patch_size x merge_size ({patch_size} x {merge_size}) overflows u32"),
            )
        })
    }

    pub fn estimate(&self, image: ImageSize, cache: &GeometryCache) -> Result<TokenEstimate> {
        let PatchMergeConfig { patch_size, merge_size, min_pixels, max_pixels } = self.config;

        let (resized_height, resized_width) =
            cache.resize_to_multiple(image.height, image.width, self.factor()?, min_pixels, max_pixels)?;
        let grid_h = resized_height / patch_size;
        let grid_w = resized_width / patch_size;

        let patch_count = u64::from(grid_h) * u64::from(grid_w);
        let token_count = merged_token_count(patch_count, merge_size);
        debug!(
            image = %image,
            resized_height,
            resized_width,
            grid_h,
            grid_w,
            token_count,
            "patch-merge estimate"
        );

        Ok(TokenEstimate {
            token_count,
            patch_count,
            resized_size: Some(ImageSize { height: resized_height, width: resized_width }),
            grid: Some(TileGrid::new(grid_w, grid_h)),
            has_global_patch: false,
        })
    }
}
