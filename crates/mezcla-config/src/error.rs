//! Error types for snapshot operations.

use std::path::PathBuf;
use thiserror::Error;

use mezcla_core::GraphError;

/// Errors that can occur while saving or restoring graph snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A structural defect in the snapshot: the edge set cannot be rebuilt
    /// (cycle, bad port, occupied single-source port). Restore fails closed
    /// rather than returning a graph with different topology.
    #[error("snapshot structure invalid: {0}")]
    Graph(#[from] GraphError),
}

impl SnapshotError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapshotError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapshotError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
