//! Config file loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::GeometryConfig;
use crate::selector::ModelFamily;

use super::profile::TokenLayout;

/// Sections a config file may nest its settings under.
const NESTED_SECTIONS: [&str; 2] = ["vt-calc", "vt_calc"];

/// On-disk configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub default_model: Option<String>,
    pub models: BTreeMap<String, ModelEntry>,
}

/// A model added or overridden by the config file. Unset fields come from the family preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelEntry {
    pub family: Option<ModelFamily>,
    pub hf_id: Option<String>,
    pub geometry: Option<GeometryConfig>,
    pub tokens: Option<TokenLayout>,
    /// `anyres_max_N`, shorthand for the grid geometry's `max_patches_cap`.
    pub vision_aspect_ratio: Option<String>,
}

/// Load the config file from `config_path`, or discover one in `dir`.
///
/// An explicit path must parse. An auto-discovered file that fails to parse is skipped with a
/// warning and defaults are used instead.
pub fn load_config(dir: &Path, config_path: Option<&Path>) -> Result<ConfigFile> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(dir),
    };

    let Some(config_file) = discovered else {
        return Ok(ConfigFile::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!(path = %config_file.display(), models = cfg.models.len(), "loaded config");
            Ok(cfg)
        }
        Err(e) if config_path_provided => Err(e),
        Err(e) => {
            tracing::warn!(
                "Failed to parse auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(ConfigFile::default())
        }
    }
}

/// Parse TOML config, supporting a nested `[vt-calc]` section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<ConfigFile> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = NESTED_SECTIONS
        .iter()
        .find_map(|section| raw.get(*section).cloned())
        .unwrap_or(raw);

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, supporting a nested `vt-calc` section.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<ConfigFile> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    // An empty document parses as null.
    if raw.is_null() {
        return Ok(ConfigFile::default());
    }

    let config_val = NESTED_SECTIONS
        .iter()
        .find_map(|section| raw.get(*section).cloned())
        .unwrap_or(raw);

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(dir: &Path) -> Option<PathBuf> {
    let candidates = ["vt-calc.toml", ".vt-calc.toml", "vt-calc.yaml", "vt-calc.yml", ".vt-calc.yml"];

    candidates.iter().map(|candidate| dir.join(candidate)).find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureSelectStrategy;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_defaults_when_missing() {
        let tmp = TempDir::new().expect("tmp");
        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg, ConfigFile::default());
    }

    #[test]
    fn test_load_toml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("vt-calc.toml"),
            r#"
default_model = "llava-next"

[models."llava-next"]
hf_id = "llava-hf/llava-v1.6-vicuna-7b-hf"

[models.wide-llava]
family = "llava"

[models.wide-llava.geometry]
kind = "fixed_crop"
resized_height = 336
resized_width = 672
patch_size = 14
feature_select_strategy = "full"
"#,
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.default_model.as_deref(), Some("llava-next"));
        assert_eq!(cfg.models.len(), 2);

        let wide = &cfg.models["wide-llava"];
        assert_eq!(wide.family, Some(ModelFamily::Llava));
        match &wide.geometry {
            Some(GeometryConfig::FixedCrop(crop)) => {
                assert_eq!(crop.resized_width, 672);
                assert_eq!(crop.num_additional_tokens, 0);
                assert_eq!(crop.feature_select_strategy, FeatureSelectStrategy::Full);
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn test_nested_yaml_section() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("vt-calc.yml"),
            "vt-calc:\n  models:\n    llava-onevision:\n      vision_aspect_ratio: anyres_max_4\n",
        )
        .expect("write");

        let cfg = load_config(tmp.path(), None).expect("config");
        assert_eq!(
            cfg.models["llava-onevision"].vision_aspect_ratio.as_deref(),
            Some("anyres_max_4")
        );
    }

    #[test]
    fn test_explicit_config_invalid_type_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "default_model = 123\n").expect("write");

        let result = load_config(tmp.path(), Some(&path));
        assert!(result.is_err(), "explicit config with invalid type should return Err");
    }

    #[test]
    fn test_explicit_config_unknown_family_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "models:\n  mine:\n    family: blip2\n").expect("write");

        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_explicit_missing_file_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        assert!(load_config(tmp.path(), Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_explicit_unsupported_extension_returns_err() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.ini");
        fs::write(&path, "default_model = qwen2-vl\n").expect("write");
        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_auto_discovered_invalid_config_returns_default() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join(".vt-calc.toml"), "models = 5\n").expect("write");

        let cfg = load_config(tmp.path(), None).expect("should not error on auto-discovery");
        assert_eq!(cfg, ConfigFile::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("typo.toml");
        fs::write(&path, "default_modle = \"llava\"\n").expect("write");
        assert!(load_config(tmp.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("empty.yaml");
        fs::write(&path, "").expect("write");
        assert_eq!(load_config(tmp.path(), Some(&path)).expect("config"), ConfigFile::default());
    }
}
