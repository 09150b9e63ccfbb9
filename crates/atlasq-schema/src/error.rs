//! Error types for schema loading.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when loading a schema tree.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read a schema file.
    #[error("failed to read schema file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The schema JSON could not be decoded into a tree.
    #[error("failed to parse schema {origin}: {source}")]
    ParseJson {
        /// Where the JSON came from: a file path or `<string>`.
        origin: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
