//! Configuration system for atlasq.
//!
//! atlasq reads TOML files named `.atlasq.toml`. Every such file between the working
//! directory and the filesystem root is collected (stopping early at one marked
//! `root = true`), then `~/.atlasq.toml` is added with the lowest precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawEmbeddingSettings, RawResolverSettings, RawSearchSettings, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::{ConfigWarning, check_thresholds};
use validate::validate_config;

/// Top-level merged configuration for atlasq.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Field path resolver settings.
    pub resolver: ResolverSettings,
    /// Embedded-document classification overrides.
    pub embedding: EmbeddingSettings,
    /// Search stage defaults.
    pub search: SearchSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging every relevant `.atlasq.toml`.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from an explicit list of files, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Returns non-fatal warnings about the merged configuration.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in `.atlasq.toml` layout.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            resolver: &self.resolver,
            embedding: &self.embedding,
            search: &self.search,
        };
        toml::to_string_pretty(&serializable)
            .map_err(|source| ConfigError::SerializeToml { source })
    }
}

/// Thresholds for fuzzy field path resolution.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Similarity a schema name needs before it is considered at all.
    pub candidate_threshold: f64,
    /// Matches at or above this similarity are preferred.
    pub strong_threshold: f64,
    /// Weakest similarity accepted when no strong match exists.
    pub moderate_threshold: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            candidate_threshold: 0.8,
            strong_threshold: 0.7,
            moderate_threshold: 0.5,
        }
    }
}

/// Path prefixes that bypass schema-based embedding classification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Fields under these prefixes are never embedded.
    pub flat_prefixes: Vec<String>,
    /// Fields under these prefixes are always embedded, keyed by their first segment.
    pub embedded_prefixes: Vec<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            flat_prefixes: vec![
                "standaloneFinancialInfo".into(),
                "consolidatedFinancialInfo".into(),
            ],
            embedded_prefixes: vec!["investmentInfo".into(), "linkedCompanies".into()],
        }
    }
}

/// Defaults for the `$search` stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search index name.
    pub index: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            index: "default".into(),
        }
    }
}

/// Borrowed view of the settings sections for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Resolver section.
    resolver: &'a ResolverSettings,
    /// Embedding section.
    embedding: &'a EmbeddingSettings,
    /// Search section.
    search: &'a SearchSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_defaults() {
        let resolver = ResolverSettings::default();
        assert!((resolver.candidate_threshold - 0.8).abs() < f64::EPSILON);
        assert!((resolver.strong_threshold - 0.7).abs() < f64::EPSILON);
        assert!((resolver.moderate_threshold - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn embedding_defaults() {
        let embedding = EmbeddingSettings::default();
        assert_eq!(
            embedding.flat_prefixes,
            ["standaloneFinancialInfo", "consolidatedFinancialInfo"]
        );
        assert_eq!(
            embedding.embedded_prefixes,
            ["investmentInfo", "linkedCompanies"]
        );
    }

    #[test]
    fn config_default() {
        let config = Config::default();
        assert_eq!(config.search.index, "default");
        assert!(config.config_root.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn settings_to_toml_round_trips() {
        let config = Config::default();
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("[embedding]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("candidate_threshold = 0.8"));
        assert!(toml.contains("index = \"default\""));

        let parsed = parse_config_str(&toml, Path::new("out.toml")).unwrap();
        let resolver = parsed.resolver.unwrap();
        assert_eq!(resolver.strong_threshold, Some(0.7));
        let embedding = parsed.embedding.unwrap();
        assert_eq!(embedding.embedded_prefixes.unwrap().len(), 2);
    }
}
