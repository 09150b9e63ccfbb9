//! Configuration merging.
//!
//! Folds parsed `.atlasq.toml` files into one `Config`. Files arrive highest precedence
//! first; they are applied lowest first so closer files overwrite.

use std::path::PathBuf;

use crate::{
    Config, ConfigError, EmbeddingSettings, ResolverSettings, SearchSettings,
    parse::{RawConfig, RawEmbeddingSettings, RawResolverSettings, RawSearchSettings},
    validate::check_thresholds,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files into a single `Config`.
///
/// Merge rules:
/// - Scalars: the closest definition wins.
/// - Prefix lists: the closest definition replaces the whole list.
///
/// Fails if the merged resolver thresholds are invalid.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let mut resolver = ResolverSettings::default();
    let mut embedding = EmbeddingSettings::default();
    let mut search = SearchSettings::default();

    for parsed in configs.iter().rev() {
        let raw = &parsed.config;
        if let Some(ref r) = raw.resolver {
            apply_raw_resolver(&mut resolver, r);
        }
        if let Some(ref e) = raw.embedding {
            apply_raw_embedding(&mut embedding, e);
        }
        if let Some(ref s) = raw.search {
            apply_raw_search(&mut search, s);
        }
    }

    check_thresholds(&resolver)?;

    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(|p| p.to_path_buf());

    Ok(Config {
        resolver,
        embedding,
        search,
        config_root,
    })
}

/// Applies raw resolver settings, overwriting present values.
fn apply_raw_resolver(result: &mut ResolverSettings, raw: &RawResolverSettings) {
    if let Some(v) = raw.candidate_threshold {
        result.candidate_threshold = v;
    }
    if let Some(v) = raw.strong_threshold {
        result.strong_threshold = v;
    }
    if let Some(v) = raw.moderate_threshold {
        result.moderate_threshold = v;
    }
}

/// Applies raw embedding overrides, replacing present lists.
fn apply_raw_embedding(result: &mut EmbeddingSettings, raw: &RawEmbeddingSettings) {
    if let Some(ref v) = raw.flat_prefixes {
        result.flat_prefixes.clone_from(v);
    }
    if let Some(ref v) = raw.embedded_prefixes {
        result.embedded_prefixes.clone_from(v);
    }
}

/// Applies raw search settings.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(ref v) = raw.index {
        result.index.clone_from(v);
    }
}
