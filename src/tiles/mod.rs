//! Tile-grid enumeration and aspect-ratio driven grid selection.

use crate::domain::{ImageSize, TileGrid};
use crate::error::{EstimateError, Result};

/// Every `columns x rows` grid whose tile count lies in `[min_tiles, max_tiles]`.
///
/// Ordered by tile count; grids with the same count keep enumeration order (columns ascending,
/// then rows ascending). The scoring in [`best_grid_among`] relies on this order for ties.
pub fn enumerate_tile_grids(min_tiles: u32, max_tiles: u32) -> Vec<TileGrid> {
    let mut grids = Vec::new();
    for columns in 1..=max_tiles {
        // Rows past `max_tiles / columns` would exceed the bound.
        for rows in 1..=max_tiles / columns {
            if columns * rows >= min_tiles {
                grids.push(TileGrid::new(columns, rows));
            }
        }
    }
    // `sort_by_key` is stable.
    grids.sort_by_key(TileGrid::tiles);
    grids
}

/// Choose the grid whose `columns / rows` is closest to the image's `width / height`.
///
/// On an exactly equal distance the later grid (more tiles) replaces the current best only while
/// the image area exceeds half of the grid's pixel capacity, which stops near-square images from
/// being over-tiled.
pub fn choose_optimal_tile_grid(
    original: ImageSize,
    tile_size: ImageSize,
    min_tiles: u32,
    max_tiles: u32,
) -> Result<TileGrid> {
    let candidates = enumerate_tile_grids(min_tiles, max_tiles);
    best_grid_among(original, tile_size, &candidates)
}

/// Scoring loop of [`choose_optimal_tile_grid`] over a precomputed candidate list.
pub fn best_grid_among(
    original: ImageSize,
    tile_size: ImageSize,
    candidates: &[TileGrid],
) -> Result<TileGrid> {
    if candidates.is_empty() {
        return Err(EstimateError::EmptyCandidateList { what: "tile grids" });
    }

    let aspect_ratio = original.aspect_ratio();
    let area = original.area() as f64;
    let tile_area = tile_size.area() as f64;

    let mut best_ratio_diff = f64::INFINITY;
    let mut best_grid = TileGrid::SINGLE;
    for &grid in candidates {
        let ratio_diff = (aspect_ratio - grid.aspect_ratio()).abs();
        if ratio_diff < best_ratio_diff {
            best_ratio_diff = ratio_diff;
            best_grid = grid;
        } else if ratio_diff == best_ratio_diff && area > 0.5 * tile_area * f64::from(grid.tiles()) {
            best_grid = grid;
        }
    }

    Ok(best_grid)
}
