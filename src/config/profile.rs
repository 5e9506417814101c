//! Model profiles and the registry they are looked up in.

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::loader::{ConfigFile, ModelEntry};
use super::presets::{builtin_profile, BUILTIN_PROFILES, DEFAULT_MODEL};
use crate::domain::GeometryConfig;
use crate::estimator::TokenEstimator;
use crate::selector::{select_family, ModelFamily};

static ANYRES_MAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^anyres_max_(\d+)$").expect("valid regex"));

/// Special tokens that surround the image placeholder run in the prompt.
///
/// Only names are kept; nothing here resolves them to tokenizer ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLayout {
    pub image_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_token: Option<String>,
}

impl TokenLayout {
    pub fn new(image_token: &str, start_token: Option<&str>, end_token: Option<&str>) -> Self {
        Self {
            image_token: image_token.to_string(),
            start_token: start_token.map(str::to_string),
            end_token: end_token.map(str::to_string),
        }
    }

    pub fn wrapper_count(&self) -> u64 {
        u64::from(self.start_token.is_some()) + u64::from(self.end_token.is_some())
    }

    /// Length of the whole image span: placeholders plus wrappers.
    pub fn sequence_tokens(&self, token_count: u64) -> u64 {
        token_count + self.wrapper_count()
    }
}

/// Everything needed to estimate one named model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelProfile {
    pub name: String,
    pub family: ModelFamily,
    pub hf_id: String,
    pub geometry: GeometryConfig,
    pub tokens: TokenLayout,
}

impl ModelProfile {
    pub fn estimator(&self) -> Result<TokenEstimator> {
        select_family(self.family, &self.geometry)
            .with_context(|| format!("Invalid geometry for model '{}'", self.name))
    }
}

/// Parse a `vision_aspect_ratio` value into a patch cap. Plain `anyres` means no cap.
pub fn parse_vision_aspect_ratio(value: &str) -> Result<Option<u32>> {
    let value = value.trim();
    if value == "anyres" {
        return Ok(None);
    }
    let caps = ANYRES_MAX
        .captures(value)
        .ok_or_else(|| anyhow!("Unsupported vision_aspect_ratio '{value}', expected 'anyres_max_N'"))?;
    let cap = caps[1]
        .parse::<u32>()
        .with_context(|| format!("vision_aspect_ratio cap out of range: {value}"))?;
    Ok(Some(cap))
}

/// Named profiles: built-in presets plus whatever the config file adds or overrides.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    default_model: String,
    profiles: BTreeMap<String, ModelProfile>,
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        let profiles =
            BUILTIN_PROFILES.iter().map(|profile| (profile.name.clone(), profile.clone())).collect();
        Self { default_model: DEFAULT_MODEL.to_string(), profiles }
    }

    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let mut registry = Self::builtin();
        for (name, entry) in &config.models {
            let key = normalize_name(name);
            let profile = resolve_entry(&key, entry, registry.profiles.get(&key))?;
            // Fail at load time rather than on first use.
            profile.estimator()?;
            tracing::debug!(model = %key, family = %profile.family, "configured model profile");
            registry.profiles.insert(key, profile);
        }

        if let Some(default_model) = &config.default_model {
            let key = normalize_name(default_model);
            if !registry.profiles.contains_key(&key) {
                bail!("default_model '{}' is not a known model", default_model);
            }
            registry.default_model = key;
        }
        Ok(registry)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Look up a profile by name (case-insensitive), falling back to the default model.
    pub fn get(&self, name: Option<&str>) -> Result<&ModelProfile> {
        let key = name.map(normalize_name).unwrap_or_else(|| self.default_model.clone());
        self.profiles.get(&key).ok_or_else(|| {
            let known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
            anyhow!("Unsupported model: {} (known models: {})", key, known.join(", "))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn resolve_entry(name: &str, entry: &ModelEntry, existing: Option<&ModelProfile>) -> Result<ModelProfile> {
    let family = match (entry.family, existing) {
        (Some(family), _) => family,
        (None, Some(profile)) => profile.family,
        (None, None) => name
            .parse::<ModelFamily>()
            .map_err(|_| anyhow!("Model '{}' needs a 'family' (one of: {})", name, family_list()))?,
    };

    // Start from the existing profile only when it belongs to the same family.
    let base = existing.filter(|p| p.family == family).unwrap_or_else(|| builtin_profile(family));

    let mut geometry = entry.geometry.clone().unwrap_or_else(|| base.geometry.clone());
    if let Some(ratio) = &entry.vision_aspect_ratio {
        let cap = parse_vision_aspect_ratio(ratio).with_context(|| format!("Model '{name}'"))?;
        match &mut geometry {
            GeometryConfig::AnyResGrid(any) => any.max_patches_cap = cap,
            other => bail!(
                "Model '{}': vision_aspect_ratio only applies to any_res_grid geometry, not {}",
                name,
                other.kind()
            ),
        }
    }

    Ok(ModelProfile {
        name: name.to_string(),
        family,
        hf_id: entry.hf_id.clone().unwrap_or_else(|| base.hf_id.clone()),
        geometry,
        tokens: entry.tokens.clone().unwrap_or_else(|| base.tokens.clone()),
    })
}

fn family_list() -> String {
    ModelFamily::ALL.iter().map(ModelFamily::id).collect::<Vec<_>>().join(", ")
}
