//! File-system collaborator for document sessions.
//!
//! The session engine never touches `std::fs` directly. It goes through the
//! [`FileSystem`] trait, which exposes exactly the four operations a session
//! needs (existence, timestamp, read, write) plus rename.
//!
//! * [`LocalFs`] talks to the real disk through `tokio::fs`.
//! * [`MemoryFs`] keeps files in memory with a controllable clock and
//!   failure injection; it backs the session tests and headless embedders.

mod error;
mod file;
mod local;
mod memory;

use async_trait::async_trait;
pub use error::{FsError, Result};
pub use file::{FileRef, TextFile, file_time};
pub use local::LocalFs;
pub use memory::MemoryFs;
use scribe_primitives::TextEncoding;

/// Default cap on file sizes loaded into memory.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 64 * 1024 * 1024;

/// Storage backend consumed by a document session.
///
/// Timestamps are nanoseconds since the Unix epoch. Implementations must be
/// shareable across the foreground task and the background poller.
#[async_trait]
pub trait FileSystem: Send + Sync + 'static {
	/// Returns whether `file` currently exists as a regular file.
	async fn exists(&self, file: &FileRef) -> Result<bool>;

	/// Returns the last-modified timestamp of `file`.
	async fn modified_time(&self, file: &FileRef) -> Result<i64>;

	/// Reads and decodes `file`, optionally forcing an encoding.
	async fn read(&self, file: &FileRef, encoding: Option<TextEncoding>) -> Result<TextFile>;

	/// Encodes and writes `text` to `file`, returning the new timestamp.
	///
	/// `text` is written verbatim; callers apply the line ending beforehand.
	async fn write(&self, file: &FileRef, text: &str, encoding: TextEncoding) -> Result<i64>;

	/// Renames `file` within its directory and returns the new identity.
	async fn rename(&self, file: &FileRef, new_name: &str) -> Result<FileRef>;
}

/// Rejects names that are empty, dot segments, or contain path separators.
pub fn validate_file_name(name: &str) -> Result<()> {
	let trimmed = name.trim();
	if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
		return Err(FsError::InvalidName(name.to_string()));
	}
	Ok(())
}
