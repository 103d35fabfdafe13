//! Error types for session operations and configuration loading.

use std::path::PathBuf;

use scribe_fs::FsError;
use thiserror::Error;

/// Errors returned by foreground session operations.
///
/// Background polling never produces these; its failures are logged.
#[derive(Debug, Error)]
pub enum SessionError {
	/// Reading, writing, or renaming the backing file failed.
	#[error(transparent)]
	Fs(#[from] FsError),

	/// The operation needs a backing file but the document is unsaved.
	#[error("document has no backing file")]
	NoBackingFile,

	/// The session has been torn down.
	#[error("session is closed")]
	Closed,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {}: {error}", path.display())]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A value parsed but is out of range.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}
