//! Model configuration
//!
//! Built-in presets for every supported family, optionally extended or overridden by a
//! `vt-calc.toml` / `vt-calc.yaml` file.

pub mod loader;
pub mod presets;
pub mod profile;

pub use loader::{load_config, ConfigFile, ModelEntry};
pub use presets::{builtin_profile, map_model_id, BUILTIN_PROFILES, DEFAULT_MODEL};
pub use profile::{parse_vision_aspect_ratio, ModelProfile, ModelRegistry, TokenLayout};
