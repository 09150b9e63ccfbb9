//! Configuration validation.
//!
//! Threshold problems are hard errors; suspicious but workable settings are reported as
//! warnings.

use std::fmt;

use crate::{Config, ConfigError, ResolverSettings};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A prefix is listed as both flat and embedded. Flat wins.
    ConflictingPrefix {
        /// The prefix in question.
        prefix: String,
    },
    /// A prefix list contains an empty string, which matches every field.
    EmptyPrefix {
        /// Which list holds the empty entry.
        list: &'static str,
    },
    /// The search index name is blank.
    BlankIndex,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingPrefix { prefix } => write!(
                f,
                "prefix '{prefix}' is both flat and embedded; it will be treated as flat"
            ),
            Self::EmptyPrefix { list } => {
                write!(f, "empty entry in embedding.{list} matches every field")
            }
            Self::BlankIndex => write!(f, "search.index is blank"),
        }
    }
}

/// Checks that thresholds lie in `[0, 1]` and that `moderate <= strong`.
pub fn check_thresholds(settings: &ResolverSettings) -> Result<(), ConfigError> {
    let named = [
        ("candidate_threshold", settings.candidate_threshold),
        ("strong_threshold", settings.strong_threshold),
        ("moderate_threshold", settings.moderate_threshold),
    ];
    for (name, value) in named {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidThresholds {
                message: format!("{name} = {value} is outside [0, 1]"),
            });
        }
    }

    if settings.moderate_threshold > settings.strong_threshold {
        return Err(ConfigError::InvalidThresholds {
            message: format!(
                "moderate_threshold ({}) exceeds strong_threshold ({})",
                settings.moderate_threshold, settings.strong_threshold
            ),
        });
    }

    Ok(())
}

/// Returns warnings for the merged configuration.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let embedding = &config.embedding;

    for prefix in &embedding.flat_prefixes {
        if embedding.embedded_prefixes.contains(prefix) {
            warnings.push(ConfigWarning::ConflictingPrefix {
                prefix: prefix.clone(),
            });
        }
    }

    if embedding.flat_prefixes.iter().any(String::is_empty) {
        warnings.push(ConfigWarning::EmptyPrefix {
            list: "flat_prefixes",
        });
    }
    if embedding.embedded_prefixes.iter().any(String::is_empty) {
        warnings.push(ConfigWarning::EmptyPrefix {
            list: "embedded_prefixes",
        });
    }

    if config.search.index.trim().is_empty() {
        warnings.push(ConfigWarning::BlankIndex);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_valid() {
        assert!(check_thresholds(&ResolverSettings::default()).is_ok());
    }

    #[test]
    fn out_of_range_threshold() {
        let settings = ResolverSettings {
            candidate_threshold: 1.2,
            ..ResolverSettings::default()
        };
        let err = check_thresholds(&settings).unwrap_err();
        assert!(err.to_string().contains("candidate_threshold"));
    }

    #[test]
    fn moderate_above_strong() {
        let settings = ResolverSettings {
            strong_threshold: 0.6,
            moderate_threshold: 0.65,
            ..ResolverSettings::default()
        };
        assert!(matches!(
            check_thresholds(&settings),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn conflicting_and_empty_prefixes_warn() {
        let mut config = Config::default();
        config.embedding.embedded_prefixes.push("standaloneFinancialInfo".into());
        config.embedding.flat_prefixes.push(String::new());
        config.search.index = " ".into();

        let warnings = config.validate();
        assert_eq!(
            warnings,
            [
                ConfigWarning::ConflictingPrefix {
                    prefix: "standaloneFinancialInfo".into()
                },
                ConfigWarning::EmptyPrefix {
                    list: "flat_prefixes"
                },
                ConfigWarning::BlankIndex,
            ]
        );
        assert!(warnings[0].to_string().contains("treated as flat"));
    }
}
