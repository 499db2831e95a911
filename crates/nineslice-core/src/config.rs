//! Deployment configuration (`nineslice.toml`).
//!
//! ```toml
//! # Effect file implementing the slice mapping
//! effect_path = "data/sliced.effect"
//! # "fixed" (user-entered scale) or "scene_item" (scale of the placement)
//! scale_mode = "fixed"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{NineSliceError, Result};

/// How the output scale is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// User-entered `output_scale_x/y`, optionally uniform.
    #[default]
    Fixed,
    /// Scale of the scene placement that embeds the parent source.
    SceneItem,
}

/// Filter deployment configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_effect_path")]
    pub effect_path: PathBuf,
    #[serde(default)]
    pub scale_mode: ScaleMode,
}

fn default_effect_path() -> PathBuf {
    PathBuf::from("data/sliced.effect")
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            effect_path: default_effect_path(),
            scale_mode: ScaleMode::default(),
        }
    }
}

impl FilterConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.effect_path.as_os_str().is_empty() {
            return Err(NineSliceError::Config("effect_path is empty".into()));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Read `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            log::info!("Loading filter config from {}", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
