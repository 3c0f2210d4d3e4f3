// src/config/mod.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::features::Windows;

pub const ENV_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";

fn default_form_window() -> usize {
    5
}
fn default_pool_size() -> usize {
    10
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Recent-form / qualifying / venue / position-gain window.
    #[serde(default = "default_form_window")]
    pub form_window: usize,
    /// Head-to-head pool and probability-normalization pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Optional feature weight override (TOML or JSON).
    #[serde(default)]
    pub weights_path: Option<PathBuf>,
    /// Directory read by the JSON record store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Venue of the upcoming event, used for venue history.
    #[serde(default)]
    pub venue_id: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            form_window: default_form_window(),
            pool_size: default_pool_size(),
            weights_path: None,
            data_dir: default_data_dir(),
            venue_id: None,
        }
    }
}

impl EngineConfig {
    pub fn windows(&self) -> Windows {
        Windows {
            form: self.form_window,
            pool: self.pool_size,
        }
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: EngineConfig = if ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON config {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("parsing TOML config {}", path.display()))?
        };
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $ENGINE_CONFIG_PATH
    /// 2) config/engine.toml
    /// 3) config/engine.json
    /// 4) defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/engine.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/engine.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    // Zero-sized windows would silently disable features.
    fn sanitized(mut self) -> Self {
        if self.form_window == 0 {
            warn!("form_window = 0 is invalid; using {}", default_form_window());
            self.form_window = default_form_window();
        }
        if self.pool_size == 0 {
            warn!("pool_size = 0 is invalid; using {}", default_pool_size());
            self.pool_size = default_pool_size();
        }
        self
    }
}
