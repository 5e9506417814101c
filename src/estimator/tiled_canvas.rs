//! InternVL: pick a tile grid by aspect ratio, encode each tile plus a global thumbnail.

use tracing::debug;

use crate::cache::GeometryCache;
use crate::domain::{ImageSize, TileGrid, TiledCanvasConfig, TokenEstimate};
use crate::error::{EstimateError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledCanvasEstimator {
    config: TiledCanvasConfig,
}

impl TiledCanvasEstimator {
    pub fn new(config: TiledCanvasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TiledCanvasConfig {
        &self.config
    }

    /// Tokens per encoded tile after pixel-unshuffle, `(tile / patch / unshuffle)²`.
    pub fn tokens_per_tile(&self) -> u64 {
        let cfg = &self.config;
        let side = cfg.tile_size / cfg.patch_size / cfg.pixel_unshuffle_factor;
        u64::from(side).pow(2)
    }

    pub fn estimate(&self, image: ImageSize, cache: &GeometryCache) -> Result<TokenEstimate> {
        let cfg = &self.config;
        let tile = ImageSize { height: cfg.tile_size, width: cfg.tile_size };
        let grid = cache.optimal_tile_grid(image, tile, cfg.min_tiles, cfg.max_tiles)?;

        let patch_count = tiled_patch_count(grid);
        let token_count = patch_count * self.tokens_per_tile();
        debug!(image = %image, grid = %grid, patch_count, token_count, "tiled-canvas estimate");

        Ok(TokenEstimate {
            token_count,
            patch_count,
            resized_size: Some(ImageSize {
                height: canvas_side(cfg.tile_size, grid.rows)?,
                width: canvas_side(cfg.tile_size, grid.columns)?,
            }),
            grid: Some(grid),
            has_global_patch: patch_count > 1,
        })
    }
}

fn canvas_side(tile_size: u32, tiles: u32) -> Result<u32> {
    tile_size.checked_mul(tiles).ok_or_else(|| {
        EstimateError::invalid_config(
            "tile_size",
            format!("canvas of {tiles} tiles of {tile_size} px overflows u32"),
        )
    })
}

/// The thumbnail is always encoded; tiles are added only when the grid has more than one.
fn tiled_patch_count(grid: TileGrid) -> u64 {
    let tiles = u64::from(grid.tiles());
    1 + if tiles > 1 { tiles } else { 0 }
}
