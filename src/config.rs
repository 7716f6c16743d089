// src/config.rs

//! Engine configuration.
//!
//! The engine does no configuration-file discovery of its own. A host that keeps
//! settings as JSON hands the text to [`EngineConfig::from_json_str`]; any field
//! left out takes its default.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::skin::scale::MAX_MAGNIFICATION;

/// Settings shared by every skin load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Built-in skin used for an empty name and as the fallback after a failed load.
    pub default_skin: String,
    /// Directory searched for skins that are not built in.
    pub skin_directory: Option<PathBuf>,
    /// Extension of external skin descriptions, without the dot.
    pub layout_extension: String,
    /// Extension of external faceplate images, without the dot.
    pub image_extension: String,
    /// Upper bound on the magnification chosen for a surface. Values outside
    /// `1..=4` are clamped.
    pub max_magnification: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_skin: "Minimal".to_string(),
            skin_directory: None,
            layout_extension: "layout".to_string(),
            image_extension: "pbm".to_string(),
            max_magnification: MAX_MAGNIFICATION,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse engine configuration")
    }

    /// `max_magnification` limited to what the raster bridge supports.
    pub fn magnification_cap(&self) -> u8 {
        self.max_magnification.clamp(1, MAX_MAGNIFICATION)
    }
}

/// Defaults, for callers that never configure anything.
pub static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);
