//! Error types for patch and configuration files.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Errors that can occur while reading, writing or checking patch and
/// configuration files.
#[derive(Debug, Error)]
pub enum PatchError {
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

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The patch is not valid JSON or does not have the patch shape
    #[error("failed to parse patch JSON: {0}")]
    JsonParse(#[source] serde_json::Error),

    /// Failed to serialize a patch
    #[error("failed to serialize patch JSON: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The engine configuration parsed but holds an invalid value
    #[error("invalid engine configuration: {0}")]
    EngineConfig(#[from] rackwire_engine::Error),

    /// Validation issues
    #[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationIssue>),
}

impl PatchError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // --- factory methods ---

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = PatchError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, PatchError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
    }

    #[test]
    fn create_dir_factory_produces_correct_variant() {
        let err = PatchError::create_dir("/dir/path", mock_io_err());
        assert!(
            matches!(err, PatchError::CreateDir { ref path, .. } if path == std::path::Path::new("/dir/path"))
        );
    }

    // --- Display formatting ---

    #[test]
    fn write_file_display() {
        let err = PatchError::write_file("/a/b.json", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to write file"), "got: {msg}");
        assert!(msg.contains("/a/b.json"), "got: {msg}");
    }

    #[test]
    fn json_parse_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let msg = PatchError::JsonParse(source).to_string();
        assert!(msg.starts_with("failed to parse patch JSON"), "got: {msg}");
    }

    #[test]
    fn validation_display_joins_issues() {
        let err = PatchError::Validation(vec![
            ValidationIssue::UnknownPlugin {
                module: 0,
                plugin: "Foo".to_string(),
            },
            ValidationIssue::ModuleIndexOutOfRange {
                wire: 1,
                module: 9,
                count: 2,
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("Foo"), "got: {msg}");
        assert!(msg.contains("; "), "got: {msg}");
    }

    // --- Error::source() chain ---

    #[test]
    fn io_variants_expose_source() {
        assert!(PatchError::read_file("/x", mock_io_err()).source().is_some());
        assert!(PatchError::write_file("/x", mock_io_err()).source().is_some());
    }

    #[test]
    fn validation_source_is_none() {
        assert!(PatchError::Validation(Vec::new()).source().is_none());
    }
}
