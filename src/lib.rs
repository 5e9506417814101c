//! vt-calc: estimate vision-token counts without running a model
//!
//! Each supported vision-language model family turns an image into a run of placeholder tokens
//! by a deterministic geometric policy. This crate reproduces those policies:
//!
//! - resize onto a merge-aligned grid, patchify and pool (Qwen2-VL, Qwen2.5-VL)
//! - aspect-ratio driven tiling plus a thumbnail (InternVL3)
//! - a single fixed crop (LLaVA 1.5)
//! - best-resolution canvas selection with padding-aware feature trimming (LLaVA-NeXT, OneVision)
//!
//! ```
//! use vt_calc::config::{builtin_profile, map_model_id};
//! use vt_calc::estimate_tokens;
//!
//! let profile = builtin_profile("qwen2-vl".parse().unwrap());
//! let estimate = estimate_tokens("qwen2-vl", 1080, 1920, &profile.geometry).unwrap();
//! assert_eq!(estimate.token_count, 2691);
//! assert_eq!(map_model_id("qwen2-vl").unwrap(), "Qwen/Qwen2-VL-2B-Instruct");
//! ```

pub mod batch;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod geometry;
pub mod render;
pub mod scan;
pub mod selector;
pub mod tiles;
pub mod utils;

pub use cache::GeometryCache;
pub use domain::{GeometryConfig, ImageSize, TileGrid, TokenEstimate};
pub use error::{EstimateError, Result};
pub use estimator::TokenEstimator;
pub use selector::{estimate_tokens, select, ModelFamily};
