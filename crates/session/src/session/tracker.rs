use crate::events::SessionEvent;
use crate::surface::TextSurface;

use super::DocumentSession;

impl<S: TextSurface> DocumentSession<S> {
	pub fn is_modified(&self) -> bool {
		self.state.is_modified
	}

	/// Whether nothing would be written by a save.
	///
	/// Always true while not loaded. Unless `compare_text_only`, any pending
	/// override counts as a change.
	pub fn no_changes_since_last_saved(&self, compare_text_only: bool) -> bool {
		if !self.state.loaded {
			return true;
		}
		if !compare_text_only && (self.state.requested_encoding.is_some() || self.state.requested_line_ending.is_some()) {
			return false;
		}
		self.surface.text() == self.snapshots.load().content()
	}

	/// Recomputes the modified flag after a content edit.
	///
	/// Ignored while not loaded or after close.
	pub fn on_text_changed(&mut self) {
		if !self.state.loaded || self.closed {
			return;
		}
		let modified = if self.state.is_modified {
			!self.no_changes_since_last_saved(false)
		} else {
			!self.no_changes_since_last_saved(true)
		};
		self.set_modified(modified);
		self.emit(SessionEvent::TextChanging);
		self.emit(SessionEvent::NavigationDismissed);
	}

	/// Edits the surface through `f`, then runs [`Self::on_text_changed`].
	pub fn edit<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
		let result = f(&mut self.surface);
		self.on_text_changed();
		result
	}

	pub(crate) fn set_modified(&mut self, modified: bool) {
		if self.state.is_modified == modified {
			return;
		}
		self.state.is_modified = modified;
		self.emit(SessionEvent::ModificationStateChanged);
	}
}
