//! Configuration file parsing.
//!
//! Each `.atlasq.toml` is parsed into a `RawConfig` whose fields are all optional, so
//! a partial file only overrides what it names.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// `[resolver]` section.
    pub resolver: Option<RawResolverSettings>,
    /// `[embedding]` section.
    pub embedding: Option<RawEmbeddingSettings>,
    /// `[search]` section.
    pub search: Option<RawSearchSettings>,
}

/// Raw resolver settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawResolverSettings {
    /// Candidate admission threshold.
    pub candidate_threshold: Option<f64>,
    /// Strong tier threshold.
    pub strong_threshold: Option<f64>,
    /// Moderate tier threshold.
    pub moderate_threshold: Option<f64>,
}

/// Raw embedding overrides. A list defined here replaces lower-precedence lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEmbeddingSettings {
    /// Prefixes never treated as embedded.
    pub flat_prefixes: Option<Vec<String>>,
    /// Prefixes always treated as embedded.
    pub embedded_prefixes: Option<Vec<String>>,
}

/// Raw search stage settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Search index name.
    pub index: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string. `path` is only used in errors.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed; the error surfaces later
/// when the file is loaded for real.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
