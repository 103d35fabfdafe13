//! Save, reload, and revert.
//!
//! Each operation commits a new baseline through one
//! [`Reinit`](crate::state::Reinit). Disk failures propagate before anything
//! is committed, so a failed save leaves the document modified and a failed
//! reload leaves the previous snapshot in place.

use scribe_fs::{FileRef, TextFile};
use scribe_primitives::TextEncoding;

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::state::{FileModificationState, Reinit};
use crate::surface::TextSurface;

use super::DocumentSession;

impl<S: TextSurface> DocumentSession<S> {
	/// Writes live text to `target` and makes it the backing file.
	pub async fn save(&mut self, target: FileRef) -> Result<()> {
		self.ensure_open()?;
		self.close_diff_preview();

		let text = self.surface.text().into_owned();
		let encoding = self.current_encoding();
		let line_ending = self.current_line_ending();
		let modified_time = self.fs.write(&target, &line_ending.apply(&text), encoding).await?;
		tracing::info!(
			path = %target.path().display(),
			encoding = %encoding,
			line_ending = %line_ending,
			"session.save"
		);

		let snapshot = TextFile::new(text, encoding, line_ending, modified_time);
		self.publish_file_state(FileModificationState::Untouched);
		self.reinit(
			Reinit::new(snapshot, Some(target))
				.reset_text(false)
				.clear_undo(true),
		);
		self.emit(SessionEvent::FileSaved);
		self.start_polling();
		Ok(())
	}

	/// Saves to the current backing file.
	pub async fn save_in_place(&mut self) -> Result<()> {
		let target = self.state.editing_file.clone().ok_or(SessionError::NoBackingFile)?;
		self.save(target).await
	}

	/// Re-reads the backing file, discarding live edits.
	///
	/// `encoding` forces a decoding instead of detection. Returns false
	/// without a backing file.
	pub async fn reload(&mut self, encoding: Option<TextEncoding>) -> Result<bool> {
		self.ensure_open()?;
		let Some(file) = self.state.editing_file.clone() else {
			return Ok(false);
		};
		let snapshot = self.fs.read(&file, encoding).await?;
		tracing::info!(
			path = %file.path().display(),
			encoding = %snapshot.encoding(),
			forced = encoding.is_some(),
			"session.reload"
		);

		self.reinit(Reinit::new(snapshot, Some(file)).clear_undo(true));
		self.emit(SessionEvent::LineEndingChanged);
		self.emit(SessionEvent::EncodingChanged);
		self.start_polling();
		self.close_diff_preview();
		self.emit(SessionEvent::NavigationDismissed);
		self.emit(SessionEvent::FileReloaded);
		Ok(true)
	}

	/// Restores live text and settings to the current snapshot without disk access.
	pub fn revert(&mut self) {
		if self.closed {
			return;
		}
		let snapshot = TextFile::clone(&self.snapshots.load());
		let file = self.state.editing_file.clone();
		self.reinit(Reinit::new(snapshot, file));
		self.emit(SessionEvent::ChangeReverted);
	}
}
