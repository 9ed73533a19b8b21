//! Typed failures raised while loading configuration and assembling documents.

use std::path::PathBuf;

use thiserror::Error;

/// Required anchors that could not be located in an entry document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
  /// The document has no script tag flagged with the build marker.
  #[error("no script tag with a `{marker}=1` flag found")]
  MissingEntryScript {
    /// Marker query key that was searched for.
    marker: String,
  },
  /// More than one script tag carries the build marker.
  #[error("found {count} script tags with a `{marker}=1` flag, expected exactly one")]
  DuplicateEntryScript {
    /// Marker query key that was searched for.
    marker: String,
    /// Number of flagged script tags.
    count: usize,
  },
  /// The document has no closing head tag to anchor preload and stylesheet links.
  #[error("no closing </head> tag found")]
  MissingHeadClose,
}

/// Errors that can occur while reading a build configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read config {}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse a JSON configuration file.
  #[error("failed to parse JSON config {}", .path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// Failed to parse a YAML configuration file.
  #[error("failed to parse YAML config {}", .path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
  /// The file extension does not name a supported format.
  #[error("unsupported config format {} (expected .json, .yaml or .yml)", .path.display())]
  UnsupportedFormat {
    /// Path that caused the error.
    path: PathBuf,
  },
}
