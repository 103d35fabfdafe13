//! Editing surface the session observes.
//!
//! The session never owns rendering or input handling. It reads live text
//! from a [`TextSurface`] and replaces it wholesale on reload and revert.
//! A revert is recorded as an undo step; reload and save clear the history.
//!
//! [`PlainTextSurface`] is a minimal in-memory surface with snapshot-based
//! undo. It backs the CLI and the tests.

use std::borrow::Cow;

use scribe_primitives::LineEnding;

/// Text buffer driven by the user and observed by the session.
///
/// `text` must use `\n` separators.
pub trait TextSurface: Send {
	/// Live content.
	fn text(&self) -> Cow<'_, str>;

	/// Replaces the live content without recording an undo step.
	fn set_text(&mut self, text: &str);

	/// Replaces the live content as one undoable step.
	fn replace_text(&mut self, text: &str);

	/// Drops every undo and redo step.
	fn clear_undo_history(&mut self);
}

/// In-memory surface with whole-text undo steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainTextSurface {
	text: String,
	undo: Vec<String>,
	redo: Vec<String>,
}

impl PlainTextSurface {
	pub fn new(text: &str) -> Self {
		Self {
			text: LineEnding::normalize(text).into_owned(),
			..Self::default()
		}
	}

	/// Inserts `text` at byte offset `at`, clamped to the end of the buffer.
	///
	/// Returns false without editing when `at` is not a char boundary.
	pub fn insert(&mut self, at: usize, text: &str) -> bool {
		let at = at.min(self.text.len());
		self.replace_range(at, at, text)
	}

	/// Replaces bytes `start..end` with `text` as one undo step.
	pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> bool {
		if start > end || !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
			return false;
		}
		let mut next = self.text.clone();
		next.replace_range(start..end, &LineEnding::normalize(text));
		self.commit(next);
		true
	}

	/// Replaces the whole buffer as one undo step.
	pub fn replace_all(&mut self, text: &str) {
		let next = LineEnding::normalize(text).into_owned();
		if next != self.text {
			self.commit(next);
		}
	}

	pub fn undo(&mut self) -> bool {
		let Some(previous) = self.undo.pop() else {
			return false;
		};
		self.redo.push(std::mem::replace(&mut self.text, previous));
		true
	}

	pub fn redo(&mut self) -> bool {
		let Some(next) = self.redo.pop() else {
			return false;
		};
		self.undo.push(std::mem::replace(&mut self.text, next));
		true
	}

	pub fn can_undo(&self) -> bool {
		!self.undo.is_empty()
	}

	pub fn can_redo(&self) -> bool {
		!self.redo.is_empty()
	}

	fn commit(&mut self, next: String) {
		self.undo.push(std::mem::replace(&mut self.text, next));
		self.redo.clear();
	}
}

impl TextSurface for PlainTextSurface {
	fn text(&self) -> Cow<'_, str> {
		Cow::Borrowed(&self.text)
	}

	fn set_text(&mut self, text: &str) {
		self.text = LineEnding::normalize(text).into_owned();
	}

	fn replace_text(&mut self, text: &str) {
		self.replace_all(text);
	}

	fn clear_undo_history(&mut self) {
		self.undo.clear();
		self.redo.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edits_undo_and_redo() {
		let mut surface = PlainTextSurface::new("ac");
		assert!(surface.insert(1, "b"));
		assert_eq!(surface.text(), "abc");
		assert!(surface.undo());
		assert_eq!(surface.text(), "ac");
		assert!(surface.redo());
		assert_eq!(surface.text(), "abc");
		assert!(!surface.redo());
	}

	#[test]
	fn set_text_bypasses_history() {
		let mut surface = PlainTextSurface::new("a");
		surface.replace_all("b");
		surface.set_text("c\r\nd");
		assert_eq!(surface.text(), "c\nd");
		assert!(surface.undo());
		assert_eq!(surface.text(), "a");
	}

	#[test]
	fn replace_text_records_one_step() {
		let mut surface = PlainTextSurface::new("a");
		surface.replace_text("b\r\n");
		assert_eq!(surface.text(), "b\n");
		assert!(surface.undo());
		assert_eq!(surface.text(), "a");
		assert!(!surface.can_undo());
	}

	#[test]
	fn rejects_split_char() {
		let mut surface = PlainTextSurface::new("é");
		assert!(!surface.insert(1, "x"));
		assert!(!surface.can_undo());
	}

	#[test]
	fn clearing_history_keeps_text() {
		let mut surface = PlainTextSurface::new("");
		surface.replace_all("x");
		surface.clear_undo_history();
		assert!(!surface.can_undo());
		assert_eq!(surface.text(), "x");
	}
}
