//! Family lookup and estimator construction

pub mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::domain::{GeometryConfig, ImageSize, TokenEstimate};
use crate::error::{EstimateError, Result};
use crate::estimator::{
    AnyResFlavor, AnyResGridEstimator, FixedCropEstimator, PatchMergeEstimator, TiledCanvasEstimator,
    TokenEstimator,
};

/// Supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelFamily {
    Qwen2Vl,
    Qwen25Vl,
    InternVl3,
    Llava,
    LlavaNext,
    LlavaOnevision,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 6] = [
        ModelFamily::Qwen2Vl,
        ModelFamily::Qwen25Vl,
        ModelFamily::InternVl3,
        ModelFamily::Llava,
        ModelFamily::LlavaNext,
        ModelFamily::LlavaOnevision,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ModelFamily::Qwen2Vl => "qwen2-vl",
            ModelFamily::Qwen25Vl => "qwen2.5-vl",
            ModelFamily::InternVl3 => "internvl3",
            ModelFamily::Llava => "llava",
            ModelFamily::LlavaNext => "llava-next",
            ModelFamily::LlavaOnevision => "llava-onevision",
        }
    }

    /// The [`GeometryConfig::kind`] this family is estimated with.
    pub fn expected_geometry(&self) -> &'static str {
        match self {
            ModelFamily::Qwen2Vl | ModelFamily::Qwen25Vl => "patch_merge",
            ModelFamily::InternVl3 => "tiled_canvas",
            ModelFamily::Llava => "fixed_crop",
            ModelFamily::LlavaNext | ModelFamily::LlavaOnevision => "any_res_grid",
        }
    }
}

impl FromStr for ModelFamily {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        ModelFamily::ALL
            .into_iter()
            .find(|family| family.id() == normalized)
            .ok_or_else(|| EstimateError::UnsupportedFamily(s.trim().to_string()))
    }
}

impl TryFrom<String> for ModelFamily {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModelFamily> for String {
    fn from(family: ModelFamily) -> Self {
        family.id().to_string()
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Build the estimator for `family_id` from a caller-supplied geometry config.
///
/// The id is matched case-insensitively. The config variant must be the one the family uses and
/// its numeric fields must be in range. Nothing is fetched.
pub fn select(family_id: &str, config: &GeometryConfig) -> Result<TokenEstimator> {
    let family: ModelFamily = family_id.parse()?;
    select_family(family, config)
}

/// [`select`] for an already-parsed family.
pub fn select_family(family: ModelFamily, config: &GeometryConfig) -> Result<TokenEstimator> {
    let estimator = match (family, config) {
        (ModelFamily::Qwen2Vl | ModelFamily::Qwen25Vl, GeometryConfig::PatchMerge(cfg)) => {
            validate::patch_merge(cfg)?;
            TokenEstimator::PatchMerge(PatchMergeEstimator::new(cfg.clone()))
        }
        (ModelFamily::InternVl3, GeometryConfig::TiledCanvas(cfg)) => {
            validate::tiled_canvas(cfg)?;
            TokenEstimator::TiledCanvas(TiledCanvasEstimator::new(cfg.clone()))
        }
        (ModelFamily::Llava, GeometryConfig::FixedCrop(cfg)) => {
            validate::fixed_crop(cfg)?;
            TokenEstimator::FixedCrop(FixedCropEstimator::new(cfg.clone()))
        }
        (ModelFamily::LlavaNext, GeometryConfig::AnyResGrid(cfg)) => {
            validate::any_res_grid(cfg)?;
            TokenEstimator::AnyResGrid(AnyResGridEstimator::new(cfg.clone(), AnyResFlavor::Next))
        }
        (ModelFamily::LlavaOnevision, GeometryConfig::AnyResGrid(cfg)) => {
            validate::any_res_grid(cfg)?;
            TokenEstimator::AnyResGrid(AnyResGridEstimator::new(cfg.clone(), AnyResFlavor::OneVision))
        }
        (family, other) => {
            return Err(EstimateError::ConfigMismatch {
                family: family.id(),
                expected: family.expected_geometry(),
                actual: other.kind(),
            })
        }
    };

    debug!(family = %family, estimator = estimator.name(), "selected estimator");
    Ok(estimator)
}

/// Estimate the vision tokens of one `image_height x image_width` image for `family_id`.
pub fn estimate_tokens(
    family_id: &str,
    image_height: u32,
    image_width: u32,
    config: &GeometryConfig,
) -> Result<TokenEstimate> {
    let image = ImageSize::new(image_height, image_width)?;
    select(family_id, config)?.estimate(image)
}
