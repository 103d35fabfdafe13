//! Poller control and publication of file-status results.

use std::sync::Arc;

use crate::error::Result;
use crate::events::SessionEvent;
use crate::poller::{CheckOutcome, PollUpdate, StatusProbe, check_status};
use crate::state::FileModificationState;
use crate::surface::TextSurface;

use super::DocumentSession;

impl<S: TextSurface> DocumentSession<S> {
	/// Starts (or restarts) background polling of the backing file.
	///
	/// Returns false without a backing file or after close.
	pub fn start_polling(&mut self) -> bool {
		if self.closed {
			return false;
		}
		let Some(file) = self.state.editing_file.clone() else {
			return false;
		};
		let probe = StatusProbe::new(Arc::clone(&self.fs), file, self.snapshots.clone());
		self.poller.start(probe).is_some()
	}

	/// Stops background polling. Idempotent; safe when never started.
	pub fn stop_polling(&mut self) {
		self.poller.stop();
	}

	pub fn is_polling(&self) -> bool {
		self.poller.is_polling()
	}

	/// Applies every queued poll result. Returns how many were applied.
	pub fn pump(&mut self) -> usize {
		let mut applied = 0;
		while let Some(update) = self.poller.try_recv() {
			if self.apply_poll_update(update) {
				applied += 1;
			}
		}
		applied
	}

	/// Waits for the next poll result and applies it.
	///
	/// Returns `None` when not polling, once the loop has exited, or after
	/// close.
	pub async fn next_poll_update(&mut self) -> Option<FileModificationState> {
		while let Some(update) = self.poller.recv().await {
			if self.apply_poll_update(update) {
				return Some(update.state);
			}
		}
		None
	}

	/// Checks the backing file now, serialized with scheduled checks.
	///
	/// Queued scheduled results are applied first so results land in check
	/// order. Returns `None` without a backing file or after close.
	pub async fn check_file_status(&mut self) -> Result<Option<FileModificationState>> {
		if self.closed {
			return Ok(None);
		}
		let Some(file) = self.state.editing_file.clone() else {
			return Ok(None);
		};
		let probe = StatusProbe::new(Arc::clone(&self.fs), file, self.snapshots.clone());
		let gate = self.poller.gate().clone();
		match check_status(&probe, &gate, &self.lifetime).await? {
			CheckOutcome::Ready { state, permit } => {
				self.pump();
				self.publish_file_state(state);
				drop(permit);
				Ok(Some(state))
			}
			CheckOutcome::Cancelled | CheckOutcome::Closed => Ok(None),
		}
	}

	fn apply_poll_update(&mut self, update: PollUpdate) -> bool {
		if self.closed || !self.poller.is_live(update.generation) {
			tracing::trace!(generation = update.generation, "session.poll.stale");
			return false;
		}
		self.publish_file_state(update.state);
		true
	}

	pub(crate) fn publish_file_state(&mut self, state: FileModificationState) {
		if self.state.file_modification_state == state {
			return;
		}
		tracing::debug!(name = %self.display_name(), ?state, "session.file_state");
		self.state.file_modification_state = state;
		self.emit(SessionEvent::FileModificationStateChanged(state));
	}
}
