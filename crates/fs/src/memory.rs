use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scribe_primitives::{LineEnding, TextEncoding};

use crate::file::encode_text;
use crate::{FileRef, FileSystem, FsError, Result, TextFile, validate_file_name};

/// In-memory [`FileSystem`] with a logical clock.
///
/// Every write advances the clock, so timestamps are strictly increasing and
/// never collide the way coarse disk timestamps can. Tests use the extra
/// knobs to simulate external edits, deletion, slow stats, and I/O failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
	inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
	files: HashMap<PathBuf, MemoryFile>,
	clock: i64,
	fail_writes: bool,
	fail_stats: bool,
	stat_delay: Duration,
	stats: usize,
	stats_in_flight: usize,
	max_stats_in_flight: usize,
}

#[derive(Debug, Clone)]
struct MemoryFile {
	bytes: Vec<u8>,
	modified_time: i64,
}

impl MemoryState {
	fn tick(&mut self) -> i64 {
		self.clock = self.clock.wrapping_add(1);
		self.clock
	}
}

/// Tracks one in-flight stat; decrements on drop so cancelled stats are counted out.
struct StatGuard {
	inner: Arc<Mutex<MemoryState>>,
}

impl Drop for StatGuard {
	fn drop(&mut self) {
		let mut state = self.inner.lock();
		state.stats_in_flight = state.stats_in_flight.saturating_sub(1);
	}
}

impl MemoryFs {
	/// Creates an empty file system.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores UTF-8 `text` at `path` and returns its new timestamp.
	pub fn insert(&self, path: impl AsRef<Path>, text: &str) -> i64 {
		self.insert_bytes(path, text.as_bytes().to_vec())
	}

	/// Stores raw `bytes` at `path` and returns its new timestamp.
	pub fn insert_bytes(&self, path: impl AsRef<Path>, bytes: Vec<u8>) -> i64 {
		let mut state = self.inner.lock();
		let modified_time = state.tick();
		state.files.insert(path.as_ref().to_path_buf(), MemoryFile { bytes, modified_time });
		modified_time
	}

	/// Stores UTF-8 `text` at `path` with an explicit timestamp.
	pub fn insert_with_time(&self, path: impl AsRef<Path>, text: &str, modified_time: i64) {
		let mut state = self.inner.lock();
		state.clock = state.clock.max(modified_time);
		state.files.insert(
			path.as_ref().to_path_buf(),
			MemoryFile {
				bytes: text.as_bytes().to_vec(),
				modified_time,
			},
		);
	}

	/// Overrides the timestamp of an existing file. Returns false if absent.
	pub fn set_modified_time(&self, path: impl AsRef<Path>, modified_time: i64) -> bool {
		let mut state = self.inner.lock();
		state.clock = state.clock.max(modified_time);
		match state.files.get_mut(path.as_ref()) {
			Some(file) => {
				file.modified_time = modified_time;
				true
			}
			None => false,
		}
	}

	/// Deletes the file at `path`. Returns false if absent.
	pub fn remove(&self, path: impl AsRef<Path>) -> bool {
		self.inner.lock().files.remove(path.as_ref()).is_some()
	}

	/// Raw bytes stored at `path`.
	pub fn bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
		self.inner.lock().files.get(path.as_ref()).map(|file| file.bytes.clone())
	}

	/// Makes every subsequent write fail with a permission error.
	pub fn fail_writes(&self, fail: bool) {
		self.inner.lock().fail_writes = fail;
	}

	/// Makes every subsequent stat fail with an I/O error.
	pub fn fail_stats(&self, fail: bool) {
		self.inner.lock().fail_stats = fail;
	}

	/// Delays every stat by `delay`, widening race windows in tests.
	pub fn set_stat_delay(&self, delay: Duration) {
		self.inner.lock().stat_delay = delay;
	}

	/// Number of stats ([`FileSystem::exists`] and [`FileSystem::modified_time`]) started so far.
	pub fn stat_count(&self) -> usize {
		self.inner.lock().stats
	}

	/// Highest number of stats ever in flight at once.
	pub fn max_concurrent_stats(&self) -> usize {
		self.inner.lock().max_stats_in_flight
	}

	async fn begin_stat(&self, file: &FileRef) -> Result<StatGuard> {
		let delay = {
			let mut state = self.inner.lock();
			state.stats = state.stats.wrapping_add(1);
			state.stats_in_flight = state.stats_in_flight.wrapping_add(1);
			state.max_stats_in_flight = state.max_stats_in_flight.max(state.stats_in_flight);
			state.stat_delay
		};
		let guard = StatGuard {
			inner: Arc::clone(&self.inner),
		};
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		if self.inner.lock().fail_stats {
			return Err(FsError::io(file.path(), io::Error::other("simulated stat failure")));
		}
		Ok(guard)
	}

	fn lookup(&self, file: &FileRef) -> Result<MemoryFile> {
		self.inner
			.lock()
			.files
			.get(file.path())
			.cloned()
			.ok_or_else(|| FsError::NotFound {
				path: file.path().to_path_buf(),
			})
	}
}

#[async_trait]
impl FileSystem for MemoryFs {
	async fn exists(&self, file: &FileRef) -> Result<bool> {
		let _guard = self.begin_stat(file).await?;
		Ok(self.inner.lock().files.contains_key(file.path()))
	}

	async fn modified_time(&self, file: &FileRef) -> Result<i64> {
		let _guard = self.begin_stat(file).await?;
		self.lookup(file).map(|found| found.modified_time)
	}

	async fn read(&self, file: &FileRef, encoding: Option<TextEncoding>) -> Result<TextFile> {
		let found = self.lookup(file)?;
		Ok(TextFile::decode(&found.bytes, encoding, LineEnding::default(), found.modified_time))
	}

	async fn write(&self, file: &FileRef, text: &str, encoding: TextEncoding) -> Result<i64> {
		let mut state = self.inner.lock();
		if state.fail_writes {
			return Err(FsError::io(
				file.path(),
				io::Error::new(io::ErrorKind::PermissionDenied, "simulated write failure"),
			));
		}
		let modified_time = state.tick();
		state.files.insert(
			file.path().to_path_buf(),
			MemoryFile {
				bytes: encode_text(text, encoding),
				modified_time,
			},
		);
		Ok(modified_time)
	}

	async fn rename(&self, file: &FileRef, new_name: &str) -> Result<FileRef> {
		validate_file_name(new_name)?;
		let target = file.sibling(new_name.trim());
		if target == *file {
			return Ok(target);
		}
		let mut state = self.inner.lock();
		if state.files.contains_key(target.path()) {
			return Err(FsError::AlreadyExists {
				path: target.path().to_path_buf(),
			});
		}
		let moved = state.files.remove(file.path()).ok_or_else(|| FsError::NotFound {
			path: file.path().to_path_buf(),
		})?;
		state.files.insert(target.path().to_path_buf(), moved);
		Ok(target)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn writes_advance_the_clock() {
		let fs = MemoryFs::new();
		let file = FileRef::new("/doc.txt");
		let first = fs.write(&file, "a", TextEncoding::UTF8).await.unwrap();
		let second = fs.write(&file, "b", TextEncoding::UTF8).await.unwrap();
		assert!(second > first);
		assert_eq!(fs.modified_time(&file).await.unwrap(), second);
	}

	#[tokio::test]
	async fn explicit_times_keep_clock_ahead() {
		let fs = MemoryFs::new();
		fs.insert_with_time("/doc.txt", "A", 100);
		let file = FileRef::new("/doc.txt");
		assert_eq!(fs.modified_time(&file).await.unwrap(), 100);
		let written = fs.write(&file, "B", TextEncoding::UTF8).await.unwrap();
		assert!(written > 100);
	}

	#[tokio::test]
	async fn removed_file_reports_missing() {
		let fs = MemoryFs::new();
		fs.insert("/doc.txt", "x");
		let file = FileRef::new("/doc.txt");
		assert!(fs.remove("/doc.txt"));
		assert!(!fs.exists(&file).await.unwrap());
		assert!(fs.modified_time(&file).await.unwrap_err().is_not_found());
		assert!(fs.read(&file, None).await.unwrap_err().is_not_found());
	}

	#[tokio::test]
	async fn injected_failures_surface_as_errors() {
		let fs = MemoryFs::new();
		let file = FileRef::new("/doc.txt");
		fs.insert("/doc.txt", "x");
		fs.fail_writes(true);
		assert!(matches!(fs.write(&file, "y", TextEncoding::UTF8).await, Err(FsError::Io { .. })));
		assert_eq!(fs.bytes("/doc.txt"), Some(b"x".to_vec()));
		fs.fail_stats(true);
		assert!(fs.exists(&file).await.is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_stats_are_tracked() {
		let fs = MemoryFs::new();
		fs.insert("/doc.txt", "x");
		fs.set_stat_delay(Duration::from_millis(50));
		let file = FileRef::new("/doc.txt");
		let (a, b) = tokio::join!(fs.exists(&file), fs.exists(&file));
		assert!(a.unwrap() && b.unwrap());
		assert_eq!(fs.stat_count(), 2);
		assert_eq!(fs.max_concurrent_stats(), 2);
	}

	#[tokio::test]
	async fn unmappable_characters_become_references() {
		let fs = MemoryFs::new();
		let file = FileRef::new("/doc.txt");
		fs.write(&file, "é日", TextEncoding::WINDOWS_1252).await.unwrap();
		assert_eq!(fs.bytes("/doc.txt"), Some(b"\xE9&#26085;".to_vec()));
	}

	#[tokio::test]
	async fn rename_moves_entry() {
		let fs = MemoryFs::new();
		fs.insert("/dir/a.txt", "a");
		let renamed = fs.rename(&FileRef::new("/dir/a.txt"), "b.txt").await.unwrap();
		assert_eq!(renamed.path(), Path::new("/dir/b.txt"));
		assert_eq!(fs.bytes("/dir/b.txt"), Some(b"a".to_vec()));
		assert!(fs.bytes("/dir/a.txt").is_none());
	}
}
