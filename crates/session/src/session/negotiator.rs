//! Pending encoding and line-ending overrides.
//!
//! An override is stored only while it differs from the snapshot. Requesting
//! the snapshot value again clears it, so switching back behaves as if the
//! user never switched, while content edits keep the document modified.

use scribe_primitives::{LineEnding, TextEncoding};

use crate::events::SessionEvent;
use crate::surface::TextSurface;

use super::DocumentSession;

impl<S: TextSurface> DocumentSession<S> {
	/// Requests that the next save use `encoding`.
	///
	/// Returns false when nothing changed.
	pub fn request_encoding(&mut self, encoding: TextEncoding) -> bool {
		let saved = self.snapshots.load().encoding();
		if encoding != saved {
			self.state.requested_encoding = Some(encoding);
			self.set_modified(true);
			self.emit(SessionEvent::EncodingChanged);
			return true;
		}
		if self.state.requested_encoding.is_some() {
			self.state.requested_encoding = None;
			let modified = !self.no_changes_since_last_saved(false);
			self.set_modified(modified);
			self.emit(SessionEvent::EncodingChanged);
			return true;
		}
		false
	}

	/// Requests that the next save use `line_ending`.
	///
	/// Returns false when nothing changed.
	pub fn request_line_ending(&mut self, line_ending: LineEnding) -> bool {
		let saved = self.snapshots.load().line_ending();
		if line_ending != saved {
			self.state.requested_line_ending = Some(line_ending);
			self.set_modified(true);
			self.emit(SessionEvent::LineEndingChanged);
			return true;
		}
		if self.state.requested_line_ending.is_some() {
			self.state.requested_line_ending = None;
			let modified = !self.no_changes_since_last_saved(false);
			self.set_modified(modified);
			self.emit(SessionEvent::LineEndingChanged);
			return true;
		}
		false
	}

	/// Encoding the next save will use.
	pub fn current_encoding(&self) -> TextEncoding {
		self.state
			.requested_encoding
			.unwrap_or_else(|| self.snapshots.load().encoding())
	}

	/// Line ending the next save will use.
	pub fn current_line_ending(&self) -> LineEnding {
		self.state
			.requested_line_ending
			.unwrap_or_else(|| self.snapshots.load().line_ending())
	}
}
