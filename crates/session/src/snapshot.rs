use std::sync::Arc;

use arc_swap::ArcSwap;
use scribe_fs::TextFile;

/// Last-saved baseline shared between the session and its poller.
///
/// The session is the only writer. The poller reads the timestamp from its
/// own task without locking.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
	current: Arc<ArcSwap<TextFile>>,
}

impl SnapshotStore {
	pub fn new(file: TextFile) -> Self {
		Self {
			current: Arc::new(ArcSwap::from_pointee(file)),
		}
	}

	/// Current snapshot.
	pub fn load(&self) -> Arc<TextFile> {
		self.current.load_full()
	}

	/// Replaces the snapshot in one step.
	pub(crate) fn store(&self, file: TextFile) {
		self.current.store(Arc::new(file));
	}

	pub fn modified_time(&self) -> i64 {
		self.current.load().modified_time()
	}
}

#[cfg(test)]
mod tests {
	use scribe_primitives::{LineEnding, TextEncoding};

	use super::*;

	#[test]
	fn readers_see_replacement_but_keep_old_value() {
		let store = SnapshotStore::new(TextFile::new("A", TextEncoding::UTF8, LineEnding::Lf, 100));
		let reader = store.clone();
		let before = reader.load();
		store.store(TextFile::new("B", TextEncoding::UTF8, LineEnding::Lf, 200));
		assert_eq!(before.content(), "A");
		assert_eq!(reader.load().content(), "B");
		assert_eq!(reader.modified_time(), 200);
	}
}
