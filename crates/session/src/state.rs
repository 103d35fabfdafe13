use scribe_fs::{FileRef, TextFile};
use scribe_primitives::{LineEnding, TextEncoding};
use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotStore;
use crate::surface::TextSurface;

/// On-disk status of the backing file relative to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileModificationState {
	/// Timestamp matches the snapshot.
	#[default]
	Untouched,
	/// Timestamp differs from the snapshot.
	Modified,
	/// The file no longer exists at its path.
	RenamedMovedOrDeleted,
}

/// Whether the session is editing or showing a diff against the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditorMode {
	#[default]
	Editing,
	DiffPreview,
}

/// Mutable session state, owned by the foreground task.
///
/// Replaced wholesale by [`Reinit`]; individual fields change only through
/// the tracker, the negotiator, and published poll results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
	pub(crate) editing_file: Option<FileRef>,
	pub(crate) requested_encoding: Option<TextEncoding>,
	pub(crate) requested_line_ending: Option<LineEnding>,
	pub(crate) is_modified: bool,
	pub(crate) file_modification_state: FileModificationState,
	pub(crate) loaded: bool,
}

impl SessionState {
	pub fn editing_file(&self) -> Option<&FileRef> {
		self.editing_file.as_ref()
	}

	pub fn requested_encoding(&self) -> Option<TextEncoding> {
		self.requested_encoding
	}

	pub fn requested_line_ending(&self) -> Option<LineEnding> {
		self.requested_line_ending
	}

	pub fn is_modified(&self) -> bool {
		self.is_modified
	}

	pub fn file_modification_state(&self) -> FileModificationState {
		self.file_modification_state
	}

	pub fn is_loaded(&self) -> bool {
		self.loaded
	}
}

/// Transactional re-initialization against a new baseline.
///
/// Assembles the next [`SessionState`] and snapshot, then swaps both in one
/// step. Pending overrides are always cleared and the result is always
/// `loaded` and unmodified. The tri-state flag carries over unchanged.
#[derive(Debug)]
#[must_use = "a re-init does nothing until applied"]
pub(crate) struct Reinit {
	snapshot: TextFile,
	file: Option<FileRef>,
	reset_text: bool,
	clear_undo: bool,
}

impl Reinit {
	/// Re-init against `snapshot` and `file`, replacing live text and keeping undo history.
	pub(crate) fn new(snapshot: TextFile, file: Option<FileRef>) -> Self {
		Self {
			snapshot,
			file,
			reset_text: true,
			clear_undo: false,
		}
	}

	pub(crate) fn reset_text(mut self, reset: bool) -> Self {
		self.reset_text = reset;
		self
	}

	pub(crate) fn clear_undo(mut self, clear: bool) -> Self {
		self.clear_undo = clear;
		self
	}

	/// Updates the surface and snapshot store, returning the state to swap in.
	///
	/// The stored snapshot content is read back from the surface so that it
	/// matches live text byte for byte.
	pub(crate) fn apply<S: TextSurface>(
		self,
		surface: &mut S,
		snapshots: &SnapshotStore,
		previous: &SessionState,
	) -> SessionState {
		if self.reset_text {
			if self.clear_undo {
				surface.set_text(self.snapshot.content());
			} else {
				surface.replace_text(self.snapshot.content());
			}
		}
		let baseline = TextFile::new(
			surface.text().into_owned(),
			self.snapshot.encoding(),
			self.snapshot.line_ending(),
			self.snapshot.modified_time(),
		);
		if self.clear_undo {
			surface.clear_undo_history();
		}
		snapshots.store(baseline);
		SessionState {
			editing_file: self.file,
			requested_encoding: None,
			requested_line_ending: None,
			is_modified: false,
			file_modification_state: previous.file_modification_state,
			loaded: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::borrow::Cow;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::surface::PlainTextSurface;

	fn snapshot(content: &str, mtime: i64) -> TextFile {
		TextFile::new(content, TextEncoding::UTF8, LineEnding::Lf, mtime)
	}

	#[test]
	fn apply_clears_overrides_and_marks_loaded() {
		let store = SnapshotStore::new(snapshot("old", 1));
		let mut surface = PlainTextSurface::new("edited");
		let previous = SessionState {
			requested_encoding: Some(TextEncoding::UTF16_LE),
			requested_line_ending: Some(LineEnding::Crlf),
			is_modified: true,
			file_modification_state: FileModificationState::Modified,
			..SessionState::default()
		};
		let file = FileRef::new("/doc.txt");
		let next = Reinit::new(snapshot("fresh", 2), Some(file.clone())).apply(&mut surface, &store, &previous);

		assert_eq!(surface.text(), Cow::Borrowed("fresh"));
		assert_eq!(store.load().content(), "fresh");
		assert_eq!(store.modified_time(), 2);
		assert_eq!(
			next,
			SessionState {
				editing_file: Some(file),
				file_modification_state: FileModificationState::Modified,
				loaded: true,
				..SessionState::default()
			}
		);
	}

	#[test]
	fn keeping_text_rebuilds_snapshot_from_surface() {
		let store = SnapshotStore::new(snapshot("", 0));
		let mut surface = PlainTextSurface::new("");
		surface.replace_all("typed");
		Reinit::new(snapshot("ignored", 5), None)
			.reset_text(false)
			.clear_undo(true)
			.apply(&mut surface, &store, &SessionState::default());

		assert_eq!(store.load().content(), "typed");
		assert!(!surface.can_undo());
	}

	#[test]
	fn text_reset_is_undoable_unless_history_is_cleared() {
		let store = SnapshotStore::new(snapshot("base", 0));
		let mut surface = PlainTextSurface::new("base");
		surface.replace_all("base!");

		Reinit::new(snapshot("base", 0), None).apply(&mut surface, &store, &SessionState::default());
		assert_eq!(surface.text(), "base");
		assert!(surface.undo());
		assert_eq!(surface.text(), "base!");

		Reinit::new(snapshot("base", 0), None)
			.clear_undo(true)
			.apply(&mut surface, &store, &SessionState::default());
		assert_eq!(surface.text(), "base");
		assert!(!surface.can_undo());
	}
}
