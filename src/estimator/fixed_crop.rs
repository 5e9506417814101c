//! LLaVA 1.5: every image is resized to one fixed crop.

use tracing::debug;

use crate::domain::{FixedCropConfig, ImageSize, TokenEstimate};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCropEstimator {
    config: FixedCropConfig,
}

impl FixedCropEstimator {
    pub fn new(config: FixedCropConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FixedCropConfig {
        &self.config
    }

    /// The image size does not influence the count; it is only reported.
    pub fn estimate(&self, image: ImageSize) -> Result<TokenEstimate> {
        let cfg = &self.config;
        let features = u64::from(cfg.resized_height / cfg.patch_size)
            * u64::from(cfg.resized_width / cfg.patch_size);
        let token_count = (features + u64::from(cfg.num_additional_tokens))
            .saturating_sub(cfg.feature_select_strategy.excluded_features());
        debug!(image = %image, features, token_count, "fixed-crop estimate");

        Ok(TokenEstimate {
            token_count,
            patch_count: 1,
            resized_size: Some(ImageSize { height: cfg.resized_height, width: cfg.resized_width }),
            grid: None,
            has_global_patch: false,
        })
    }
}
