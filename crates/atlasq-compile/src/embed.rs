//! Embedded-document classification.
//!
//! Decides whether a leaf's field lives inside a repeated sub-document and, if
//! so, which path its `embeddedDocument` wrapper is keyed by.

use atlasq_config::EmbeddingSettings;
use atlasq_schema::ResolvedField;

/// Prefix overrides plus the schema-derived fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingRules {
    /// Fields under these prefixes are never embedded.
    pub flat_prefixes: Vec<String>,
    /// Fields under these prefixes are always embedded under their first segment.
    pub embedded_prefixes: Vec<String>,
}

impl EmbeddingRules {
    /// Rules with no prefix overrides; classification comes from the schema alone.
    pub fn schema_only() -> Self {
        Self::default()
    }

    /// Returns the embedding parent path for `field`, or `None` if it is flat.
    ///
    /// Rules apply in order: flat prefixes, undotted fields, embedded prefixes,
    /// then the resolved node's parent being a list. In the last case the
    /// wrapper keeps the caller's spelling unless the field skipped levels of
    /// the schema, in which case the canonical parent path is used.
    pub fn classify(&self, field: &str, resolved: &ResolvedField) -> Option<String> {
        if self.flat_prefixes.iter().any(|p| field.starts_with(p.as_str())) {
            return None;
        }

        let (parent, _) = field.rsplit_once('.')?;

        if self
            .embedded_prefixes
            .iter()
            .any(|p| field.starts_with(p.as_str()))
        {
            return field.split('.').next().map(str::to_string);
        }

        if !(resolved.exists() && resolved.parent_is_list) {
            return None;
        }
        if parent.split('.').count() + 1 == resolved.canonical_path.split('.').count() {
            return Some(parent.to_string());
        }
        // The caller skipped levels; the list is named by the schema path.
        resolved
            .canonical_path
            .rsplit_once('.')
            .map(|(list, _)| list.to_string())
    }
}

impl From<&EmbeddingSettings> for EmbeddingRules {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            flat_prefixes: settings.flat_prefixes.clone(),
            embedded_prefixes: settings.embedded_prefixes.clone(),
        }
    }
}
