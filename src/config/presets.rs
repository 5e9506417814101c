//! Built-in model presets

use once_cell::sync::Lazy;

use super::profile::{ModelProfile, TokenLayout};
use crate::domain::{
    AnyResGridConfig, FeatureSelectStrategy, FixedCropConfig, GeometryConfig, PatchMergeConfig,
    TiledCanvasConfig,
};
use crate::error::Result;
use crate::selector::ModelFamily;

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "qwen2.5-vl";

/// One preset per family, in [`ModelFamily::ALL`] order.
pub static BUILTIN_PROFILES: Lazy<Vec<ModelProfile>> =
    Lazy::new(|| ModelFamily::ALL.into_iter().map(preset).collect());

/// Built-in profile of `family`.
pub fn builtin_profile(family: ModelFamily) -> &'static ModelProfile {
    &BUILTIN_PROFILES[family as usize]
}

/// Hugging Face repository id of a supported short model name.
pub fn map_model_id(model_name: &str) -> Result<&'static str> {
    let family: ModelFamily = model_name.parse()?;
    Ok(builtin_profile(family).hf_id.as_str())
}

fn hf_id(family: ModelFamily) -> &'static str {
    match family {
        ModelFamily::Qwen2Vl => "Qwen/Qwen2-VL-2B-Instruct",
        ModelFamily::Qwen25Vl => "Qwen/Qwen2.5-VL-3B-Instruct",
        ModelFamily::InternVl3 => "OpenGVLab/InternVL3-1B-hf",
        ModelFamily::Llava => "llava-hf/llava-1.5-7b-hf",
        ModelFamily::LlavaNext => "llava-hf/llava-v1.6-mistral-7b-hf",
        ModelFamily::LlavaOnevision => "llava-hf/llava-onevision-qwen2-7b-ov-hf",
    }
}

fn preset(family: ModelFamily) -> ModelProfile {
    let (geometry, tokens) = match family {
        ModelFamily::Qwen2Vl | ModelFamily::Qwen25Vl => (
            GeometryConfig::PatchMerge(PatchMergeConfig {
                patch_size: 14,
                merge_size: 2,
                min_pixels: 56 * 56,
                max_pixels: 14 * 14 * 4 * 16_384,
            }),
            TokenLayout::new("<|image_pad|>", Some("<|im_start|>"), Some("<|im_end|>")),
        ),
        ModelFamily::InternVl3 => (
            GeometryConfig::TiledCanvas(TiledCanvasConfig {
                tile_size: 448,
                min_tiles: 1,
                max_tiles: 12,
                patch_size: 14,
                pixel_unshuffle_factor: 2,
            }),
            TokenLayout::new("<IMG_CONTEXT>", Some("<img>"), Some("</img>")),
        ),
        ModelFamily::Llava => (
            GeometryConfig::FixedCrop(FixedCropConfig {
                resized_height: 336,
                resized_width: 336,
                patch_size: 14,
                num_additional_tokens: 1,
                feature_select_strategy: FeatureSelectStrategy::Default,
            }),
            TokenLayout::new("<image>", None, None),
        ),
        ModelFamily::LlavaNext => (
            GeometryConfig::AnyResGrid(AnyResGridConfig {
                grid_pinpoints: vec![(336, 672), (672, 336), (672, 672), (1008, 336), (336, 1008)],
                tile_size: 336,
                patch_size: 14,
                num_additional_tokens: 1,
                feature_select_strategy: FeatureSelectStrategy::Default,
                max_patches_cap: None,
            }),
            TokenLayout::new("<image>", None, None),
        ),
        ModelFamily::LlavaOnevision => (
            GeometryConfig::AnyResGrid(AnyResGridConfig {
                grid_pinpoints: square_pinpoints(384, 6),
                tile_size: 384,
                patch_size: 14,
                num_additional_tokens: 0,
                feature_select_strategy: FeatureSelectStrategy::Full,
                max_patches_cap: Some(9),
            }),
            TokenLayout::new("<image>", None, None),
        ),
    };

    ModelProfile {
        name: family.id().to_string(),
        family,
        hf_id: hf_id(family).to_string(),
        geometry,
        tokens,
    }
}

/// `(tile*i, tile*j)` for `i, j` in `1..=n`, row-major in `i`.
fn square_pinpoints(tile: u32, n: u32) -> Vec<(u32, u32)> {
    (1..=n).flat_map(|i| (1..=n).map(move |j| (tile * i, tile * j))).collect()
}
