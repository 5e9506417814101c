//! Pure numeric primitives behind every estimation policy.
//!
//! Nothing here allocates beyond its return value or keeps state; every function is safe to call
//! from any thread and to memoize.

pub mod features;
pub mod resize;
pub mod resolution;

pub use features::get_unpadded_features;
pub use resize::{resize_to_multiple, DEFAULT_FACTOR, MAX_ASPECT_RATIO};
pub use resolution::{get_padding_size, get_patch_output_size, select_best_resolution};
