//! Change notifications raised by a document session.
//!
//! Every event is a zero-payload "re-read the property" signal except
//! [`SessionEvent::FileModificationStateChanged`] and
//! [`SessionEvent::ModeChanged`], which carry the new value for convenience.
//! Subscribers run synchronously on the foreground task after the
//! state transition that raised the event has committed.

use std::fmt;

use crate::state::{EditorMode, FileModificationState};

/// A state transition observed by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
	/// `is_modified` changed value.
	ModificationStateChanged,
	/// The tri-state file-modification flag changed value.
	FileModificationStateChanged(FileModificationState),
	/// The effective line ending changed.
	LineEndingChanged,
	/// The effective encoding changed.
	EncodingChanged,
	/// A save completed.
	FileSaved,
	/// A reload completed.
	FileReloaded,
	/// A revert completed.
	ChangeReverted,
	/// Live text was edited.
	TextChanging,
	/// Entered or left diff preview.
	ModeChanged(EditorMode),
	/// The backing file or placeholder name changed.
	FileRenamed,
	/// Any in-progress search or navigation UI should close.
	NavigationDismissed,
}

impl SessionEvent {
	/// Stable event name for logs.
	pub const fn name(&self) -> &'static str {
		match self {
			Self::ModificationStateChanged => "modification_state_changed",
			Self::FileModificationStateChanged(_) => "file_modification_state_changed",
			Self::LineEndingChanged => "line_ending_changed",
			Self::EncodingChanged => "encoding_changed",
			Self::FileSaved => "file_saved",
			Self::FileReloaded => "file_reloaded",
			Self::ChangeReverted => "change_reverted",
			Self::TextChanging => "text_changing",
			Self::ModeChanged(_) => "mode_changed",
			Self::FileRenamed => "file_renamed",
			Self::NavigationDismissed => "navigation_dismissed",
		}
	}
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SessionEvent) + Send>;

/// Ordered observer list. Listeners are invoked in subscription order.
#[derive(Default)]
pub struct EventBus {
	listeners: Vec<(SubscriptionId, Listener)>,
	next_id: u64,
}

impl fmt::Debug for EventBus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventBus").field("listeners", &self.listeners.len()).finish()
	}
}

impl EventBus {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + Send + 'static) -> SubscriptionId {
		self.next_id = self.next_id.wrapping_add(1);
		let id = SubscriptionId(self.next_id);
		self.listeners.push((id, Box::new(listener)));
		id
	}

	/// Removes a listener. Returns false if it was already gone.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(existing, _)| *existing != id);
		self.listeners.len() != before
	}

	pub fn emit(&mut self, event: SessionEvent) {
		tracing::trace!(event = event.name(), listeners = self.listeners.len(), "session.event");
		for (_, listener) in &mut self.listeners {
			listener(&event);
		}
	}

	pub fn clear(&mut self) {
		self.listeners.clear();
	}

	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}
}
