//! LLaVA-NeXT / LLaVA-OneVision: best-resolution canvas, unpadded tile features and a base patch.

use tracing::debug;

use crate::domain::{AnyResGridConfig, ImageSize, TileGrid, TokenEstimate};
use crate::error::Result;
use crate::geometry::{get_padding_size, get_patch_output_size, get_unpadded_features, select_best_resolution};

/// Which member of the any-resolution family is being estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyResFlavor {
    /// LLaVA-NeXT: counts `num_additional_tokens` on top of the base patch.
    Next,
    /// LLaVA-OneVision: no additional tokens.
    OneVision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyResGridEstimator {
    config: AnyResGridConfig,
    flavor: AnyResFlavor,
}

impl AnyResGridEstimator {
    pub fn new(config: AnyResGridConfig, flavor: AnyResFlavor) -> Self {
        Self { config, flavor }
    }

    pub fn config(&self) -> &AnyResGridConfig {
        &self.config
    }

    pub fn flavor(&self) -> AnyResFlavor {
        self.flavor
    }

    fn pinpoints(&self) -> Vec<ImageSize> {
        self.config
            .grid_pinpoints
            .iter()
            .map(|&(height, width)| ImageSize { height, width })
            .collect()
    }

    fn additional_tokens(&self) -> u64 {
        match self.flavor {
            AnyResFlavor::Next => u64::from(self.config.num_additional_tokens),
            AnyResFlavor::OneVision => 0,
        }
    }

    pub fn estimate(&self, image: ImageSize) -> Result<TokenEstimate> {
        let cfg = &self.config;
        let best = select_best_resolution(image, &self.pinpoints())?;

        let scale_h = best.height / cfg.tile_size;
        let scale_w = best.width / cfg.tile_size;
        let patches_per_tile = cfg.tile_size / cfg.patch_size;

        let (unpadded, newline) = get_unpadded_features(
            image.height,
            image.width,
            patches_per_tile,
            patches_per_tile,
            scale_h,
            scale_w,
            cfg.max_patches_cap,
        );
        let base = u64::from(patches_per_tile).pow(2) + self.additional_tokens();
        let token_count =
            (unpadded + newline + base).saturating_sub(cfg.feature_select_strategy.excluded_features());

        let placed = get_patch_output_size(image, best);
        match get_padding_size(placed, best) {
            Ok(padding) => debug!(
                image = %image,
                best = %best,
                placed = %placed,
                ?padding,
                unpadded,
                newline,
                token_count,
                "any-res estimate"
            ),
            Err(err) => debug!(image = %image, best = %best, %err, "any-res placement overflow"),
        }

        Ok(TokenEstimate {
            token_count,
            patch_count: u64::from(scale_h) * u64::from(scale_w) + 1,
            resized_size: Some(best),
            grid: Some(TileGrid::new(scale_w, scale_h)),
            has_global_patch: true,
        })
    }
}
