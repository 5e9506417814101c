//! Range checks applied to a geometry config before an estimator is built.

use crate::domain::{AnyResGridConfig, FixedCropConfig, PatchMergeConfig, TiledCanvasConfig};
use crate::error::{EstimateError, Result};

fn positive(field: &'static str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(EstimateError::invalid_config(field, "must be positive"));
    }
    Ok(())
}

pub fn patch_merge(cfg: &PatchMergeConfig) -> Result<()> {
    positive("patch_size", cfg.patch_size.into())?;
    positive("merge_size", cfg.merge_size.into())?;
    if cfg.patch_size.checked_mul(cfg.merge_size).is_none() {
        return Err(EstimateError::invalid_config(
            "merge_size",
            format!("patch_size x merge_size ({} x {}) overflows u32", cfg.patch_size, cfg.merge_size),
        ));
    }
    if cfg.max_pixels <= cfg.min_pixels {
        return Err(EstimateError::invalid_config(
            "max_pixels",
            format!("must exceed min_pixels ({}), got {}", cfg.min_pixels, cfg.max_pixels),
        ));
    }
    Ok(())
}

pub fn tiled_canvas(cfg: &TiledCanvasConfig) -> Result<()> {
    positive("tile_size", cfg.tile_size.into())?;
    positive("patch_size", cfg.patch_size.into())?;
    positive("min_tiles", cfg.min_tiles.into())?;
    positive("pixel_unshuffle_factor", cfg.pixel_unshuffle_factor.into())?;
    if cfg.max_tiles < cfg.min_tiles {
        return Err(EstimateError::invalid_config(
            "max_tiles",
            format!("must be at least min_tiles ({}), got {}", cfg.min_tiles, cfg.max_tiles),
        ));
    }
    if cfg.tile_size.checked_mul(cfg.max_tiles).is_none() {
        return Err(EstimateError::invalid_config(
            "tile_size",
            format!("a canvas of {} tiles of {} px overflows u32", cfg.max_tiles, cfg.tile_size),
        ));
    }
    if u64::from(cfg.patch_size) * u64::from(cfg.pixel_unshuffle_factor) > u64::from(cfg.tile_size) {
        return Err(EstimateError::invalid_config(
            "patch_size",
            format!(
                "patch_size x pixel_unshuffle_factor ({} x {}) exceeds tile_size {}",
                cfg.patch_size, cfg.pixel_unshuffle_factor, cfg.tile_size
            ),
        ));
    }
    Ok(())
}

pub fn fixed_crop(cfg: &FixedCropConfig) -> Result<()> {
    positive("resized_height", cfg.resized_height.into())?;
    positive("resized_width", cfg.resized_width.into())?;
    positive("patch_size", cfg.patch_size.into())?;
    if cfg.patch_size > cfg.resized_height.min(cfg.resized_width) {
        return Err(EstimateError::invalid_config(
            "patch_size",
            format!(
                "{} exceeds the crop {}x{}",
                cfg.patch_size, cfg.resized_height, cfg.resized_width
            ),
        ));
    }
    Ok(())
}

pub fn any_res_grid(cfg: &AnyResGridConfig) -> Result<()> {
    positive("tile_size", cfg.tile_size.into())?;
    positive("patch_size", cfg.patch_size.into())?;
    if cfg.patch_size > cfg.tile_size {
        return Err(EstimateError::invalid_config(
            "patch_size",
            format!("{} exceeds tile_size {}", cfg.patch_size, cfg.tile_size),
        ));
    }
    if cfg.grid_pinpoints.is_empty() {
        return Err(EstimateError::EmptyCandidateList { what: "grid_pinpoints" });
    }
    if let Some(&(height, width)) =
        cfg.grid_pinpoints.iter().find(|&&(h, w)| h < cfg.tile_size || w < cfg.tile_size)
    {
        return Err(EstimateError::invalid_config(
            "grid_pinpoints",
            format!("{height}x{width} is smaller than one {} tile", cfg.tile_size),
        ));
    }
    if cfg.max_patches_cap == Some(0) {
        return Err(EstimateError::invalid_config("max_patches_cap", "must be positive when set"));
    }
    Ok(())
}
