//! Error types for file-system operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a [`crate::FileSystem`] implementation.
#[derive(Debug, Error)]
pub enum FsError {
	/// The backing file does not exist.
	#[error("file not found: {}", path.display())]
	NotFound {
		/// Path that was looked up.
		path: PathBuf,
	},

	/// Any other I/O failure: permissions, locks, missing parent directory.
	#[error("I/O error on {}: {error}", path.display())]
	Io {
		/// Path the operation targeted.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		error: io::Error,
	},

	/// The file exceeds the configured size cap.
	#[error("{} is {len} bytes, over the {limit} byte limit", path.display())]
	TooLarge {
		/// Path of the oversized file.
		path: PathBuf,
		/// Actual size in bytes.
		len: u64,
		/// Configured limit in bytes.
		limit: u64,
	},

	/// A rename target is empty or contains a path separator.
	#[error("invalid file name: {0:?}")]
	InvalidName(String),

	/// A rename target is already taken.
	#[error("{} already exists", path.display())]
	AlreadyExists {
		/// The occupied path.
		path: PathBuf,
	},
}

impl FsError {
	/// Classifies an I/O error, folding `NotFound` into [`FsError::NotFound`].
	pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
		let path = path.into();
		match error.kind() {
			io::ErrorKind::NotFound => Self::NotFound { path },
			_ => Self::Io { path, error },
		}
	}

	/// Returns true when the error means the file is gone.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}
}

/// Result type for file-system operations.
pub type Result<T> = std::result::Result<T, FsError>;
