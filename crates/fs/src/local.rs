use std::io;

use async_trait::async_trait;
use scribe_primitives::{LineEnding, TextEncoding};

use crate::file::encode_text;
use crate::{DEFAULT_MAX_FILE_BYTES, FileRef, FileSystem, FsError, Result, TextFile, file_time, validate_file_name};

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
	max_file_bytes: u64,
	default_line_ending: LineEnding,
}

impl Default for LocalFs {
	fn default() -> Self {
		Self::new()
	}
}

impl LocalFs {
	/// Creates a backend with the default size cap and native line ending.
	pub fn new() -> Self {
		Self {
			max_file_bytes: DEFAULT_MAX_FILE_BYTES,
			default_line_ending: LineEnding::native(),
		}
	}

	/// Sets the largest file [`FileSystem::read`] will load.
	pub fn with_max_file_bytes(mut self, limit: u64) -> Self {
		self.max_file_bytes = limit;
		self
	}

	/// Sets the line ending reported for files without any line break.
	pub fn with_default_line_ending(mut self, line_ending: LineEnding) -> Self {
		self.default_line_ending = line_ending;
		self
	}
}

#[async_trait]
impl FileSystem for LocalFs {
	async fn exists(&self, file: &FileRef) -> Result<bool> {
		match tokio::fs::metadata(file.path()).await {
			Ok(meta) => Ok(meta.is_file()),
			Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
			Err(error) => Err(FsError::io(file.path(), error)),
		}
	}

	async fn modified_time(&self, file: &FileRef) -> Result<i64> {
		let meta = tokio::fs::metadata(file.path()).await.map_err(|e| FsError::io(file.path(), e))?;
		let modified = meta.modified().map_err(|e| FsError::io(file.path(), e))?;
		Ok(file_time(modified))
	}

	async fn read(&self, file: &FileRef, encoding: Option<TextEncoding>) -> Result<TextFile> {
		let meta = tokio::fs::metadata(file.path()).await.map_err(|e| FsError::io(file.path(), e))?;
		if meta.len() > self.max_file_bytes {
			return Err(FsError::TooLarge {
				path: file.path().to_path_buf(),
				len: meta.len(),
				limit: self.max_file_bytes,
			});
		}
		let bytes = tokio::fs::read(file.path()).await.map_err(|e| FsError::io(file.path(), e))?;
		let modified_time = self.modified_time(file).await?;
		tracing::debug!(path = %file.path().display(), len = bytes.len(), "fs.local.read");
		Ok(TextFile::decode(&bytes, encoding, self.default_line_ending, modified_time))
	}

	async fn write(&self, file: &FileRef, text: &str, encoding: TextEncoding) -> Result<i64> {
		let bytes = encode_text(text, encoding);
		tokio::fs::write(file.path(), &bytes).await.map_err(|e| FsError::io(file.path(), e))?;
		tracing::debug!(path = %file.path().display(), len = bytes.len(), encoding = %encoding, "fs.local.write");
		self.modified_time(file).await
	}

	async fn rename(&self, file: &FileRef, new_name: &str) -> Result<FileRef> {
		validate_file_name(new_name)?;
		let target = file.sibling(new_name.trim());
		if target == *file {
			return Ok(target);
		}
		if tokio::fs::try_exists(target.path()).await.map_err(|e| FsError::io(target.path(), e))? {
			return Err(FsError::AlreadyExists {
				path: target.path().to_path_buf(),
			});
		}
		tokio::fs::rename(file.path(), target.path())
			.await
			.map_err(|e| FsError::io(file.path(), e))?;
		Ok(target)
	}
}
