//! Core value types shared by the estimators and the outer layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EstimateError, Result};

/// Image dimensions in pixels. Both sides are positive once constructed through [`ImageSize::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(EstimateError::InvalidImageSize { height, width });
        }
        Ok(Self { height, width })
    }

    pub fn area(&self) -> u64 {
        u64::from(self.height) * u64::from(self.width)
    }

    /// `width / height`
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Ratio of the longer side to the shorter one, always `>= 1.0`.
    pub fn absolute_aspect_ratio(&self) -> f64 {
        let long = self.height.max(self.width);
        let short = self.height.min(self.width);
        f64::from(long) / f64::from(short)
    }
}

impl fmt::Display for ImageSize {
    // Reports use width-first order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// A `columns x rows` partition of an image into same-size tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileGrid {
    pub columns: u32,
    pub rows: u32,
}

impl TileGrid {
    pub const SINGLE: TileGrid = TileGrid { columns: 1, rows: 1 };

    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn tiles(&self) -> u32 {
        self.columns * self.rows
    }

    /// `columns / rows`, comparable with [`ImageSize::aspect_ratio`].
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.columns) / f64::from(self.rows)
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.columns, self.rows)
    }
}

/// Whether the leading class-summary feature is dropped from the visual sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSelectStrategy {
    /// The CLS feature is excluded, one token fewer.
    #[default]
    Default,
    Full,
}

impl FeatureSelectStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSelectStrategy::Default => "default",
            FeatureSelectStrategy::Full => "full",
        }
    }

    /// Tokens removed from the emitted sequence under this strategy.
    pub fn excluded_features(&self) -> u64 {
        match self {
            FeatureSelectStrategy::Default => 1,
            FeatureSelectStrategy::Full => 0,
        }
    }
}

impl FromStr for FeatureSelectStrategy {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(FeatureSelectStrategy::Default),
            "full" => Ok(FeatureSelectStrategy::Full),
            other => Err(EstimateError::InvalidConfig {
                field: "feature_select_strategy",
                reason: format!("expected 'default' or 'full', got '{other}'"),
            }),
        }
    }
}

/// Qwen-style resize, patchify and merge geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatchMergeConfig {
    pub patch_size: u32,
    pub merge_size: u32,
    pub min_pixels: u64,
    pub max_pixels: u64,
}

/// InternVL-style tiled canvas geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TiledCanvasConfig {
    /// Edge of the square tile in pixels.
    pub tile_size: u32,
    pub min_tiles: u32,
    pub max_tiles: u32,
    pub patch_size: u32,
    pub pixel_unshuffle_factor: u32,
}

/// LLaVA 1.5 fixed crop geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedCropConfig {
    pub resized_height: u32,
    pub resized_width: u32,
    pub patch_size: u32,
    #[serde(default)]
    pub num_additional_tokens: u32,
    #[serde(default)]
    pub feature_select_strategy: FeatureSelectStrategy,
}

/// LLaVA-NeXT / OneVision best-resolution grid geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnyResGridConfig {
    /// Candidate canvases as `(height, width)` pairs, in preference order.
    pub grid_pinpoints: Vec<(u32, u32)>,
    pub tile_size: u32,
    pub patch_size: u32,
    #[serde(default)]
    pub num_additional_tokens: u32,
    #[serde(default)]
    pub feature_select_strategy: FeatureSelectStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_patches_cap: Option<u32>,
}

/// Per-family geometry, supplied by the model-configuration provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryConfig {
    PatchMerge(PatchMergeConfig),
    TiledCanvas(TiledCanvasConfig),
    FixedCrop(FixedCropConfig),
    AnyResGrid(AnyResGridConfig),
}

impl GeometryConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            GeometryConfig::PatchMerge(_) => "patch_merge",
            GeometryConfig::TiledCanvas(_) => "tiled_canvas",
            GeometryConfig::FixedCrop(_) => "fixed_crop",
            GeometryConfig::AnyResGrid(_) => "any_res_grid",
        }
    }
}

/// Result of a single estimate. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEstimate {
    pub token_count: u64,
    pub patch_count: u64,
    pub resized_size: Option<ImageSize>,
    pub grid: Option<TileGrid>,
    pub has_global_patch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size_rejects_zero_dimensions() {
        assert_eq!(
            ImageSize::new(0, 10),
            Err(EstimateError::InvalidImageSize { height: 0, width: 10 })
        );
        assert!(ImageSize::new(10, 0).is_err());
        assert!(ImageSize::new(1, 1).is_ok());
    }

    #[test]
    fn image_size_ratios() {
        let size = ImageSize::new(100, 300).expect("size");
        assert_eq!(size.area(), 30_000);
        assert!((size.aspect_ratio() - 3.0).abs() < f64::EPSILON);
        assert!((size.absolute_aspect_ratio() - 3.0).abs() < f64::EPSILON);
        assert_eq!(size.to_string(), "300 x 100");
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!(" Default ".parse::<FeatureSelectStrategy>(), Ok(FeatureSelectStrategy::Default));
        assert_eq!("FULL".parse::<FeatureSelectStrategy>(), Ok(FeatureSelectStrategy::Full));
        assert!("cls".parse::<FeatureSelectStrategy>().is_err());
    }

    #[test]
    fn geometry_config_uses_kind_tag() {
        let cfg: GeometryConfig = serde_json::from_str(
            r#"{"kind":"patch_merge","patch_size":14,"merge_size":2,"min_pixels":3136,"max_pixels":12845056}"#,
        )
        .expect("parse");
        assert_eq!(cfg.kind(), "patch_merge");

        let cfg: GeometryConfig = serde_json::from_str(
            r#"{"kind":"any_res_grid","grid_pinpoints":[[336,672]],"tile_size":336,"patch_size":14}"#,
        )
        .expect("parse");
        match cfg {
            GeometryConfig::AnyResGrid(any) => {
                assert_eq!(any.feature_select_strategy, FeatureSelectStrategy::Default);
                assert_eq!(any.max_patches_cap, None);
                assert_eq!(any.grid_pinpoints, vec![(336, 672)]);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }
}
