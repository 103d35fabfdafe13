//! The document session controller.
//!
//! # Purpose
//!
//! Owns one document: its editing surface, last-saved snapshot, pending
//! encoding and line-ending overrides, derived modification flags, and the
//! background poller that watches the backing file.
//!
//! # Key types
//!
//! | Type | Role |
//! |---|---|
//! | [`DocumentSession`] | Foreground owner of all state |
//! | [`SessionState`] | Mutable fields, replaced wholesale on re-init |
//! | [`SnapshotStore`] | Last-saved baseline, shared read-only with the poller |
//! | [`FilePoller`] | Background loop plus the gate shared with manual checks |
//!
//! # Invariants
//!
//! * `is_modified` is false while not loaded.
//! * A pending override that differs from the snapshot keeps `is_modified` true.
//! * Only save, reload, revert, and construction replace the snapshot, and each
//!   does so through one [`Reinit`](crate::state::Reinit) step.
//! * At most one poll generation is live; results from any other generation
//!   are discarded.
//! * After [`DocumentSession::close`] no poll result is applied and no event
//!   is delivered.
//!
//! # Lifecycle
//!
//! [`DocumentSession::open`] reads the file and starts polling.
//! [`DocumentSession::new_untitled`] starts without a backing file and without
//! polling. The first save attaches a file and starts polling. `close` (or
//! drop) stops the poller and closes its gate.

mod metadata;
mod negotiator;
mod protocol;
mod status;
mod tracker;


use std::borrow::Cow;
use std::sync::Arc;

pub use metadata::SessionMetadata;
use scribe_fs::{FileRef, FileSystem, TextFile};
use scribe_worker::{GenerationClock, GenerationToken};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent, SubscriptionId};
use crate::poller::FilePoller;
use crate::snapshot::SnapshotStore;
use crate::state::{EditorMode, FileModificationState, Reinit, SessionState};
use crate::surface::{PlainTextSurface, TextSurface};

/// Name shown for a document that has never been saved.
pub const DEFAULT_PLACEHOLDER: &str = "Untitled.txt";

/// A document bound to an optional backing file.
pub struct DocumentSession<S: TextSurface = PlainTextSurface> {
	fs: Arc<dyn FileSystem>,
	config: SessionConfig,
	surface: S,
	snapshots: SnapshotStore,
	state: SessionState,
	mode: EditorMode,
	placeholder: String,
	events: EventBus,
	poller: FilePoller,
	lifetime: GenerationToken,
	closed: bool,
}

impl<S: TextSurface> std::fmt::Debug for DocumentSession<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DocumentSession")
			.field("state", &self.state)
			.field("mode", &self.mode)
			.field("placeholder", &self.placeholder)
			.field("poller", &self.poller)
			.field("closed", &self.closed)
			.finish_non_exhaustive()
	}
}

impl DocumentSession<PlainTextSurface> {
	/// Empty document with no backing file.
	pub fn new_untitled(fs: Arc<dyn FileSystem>, config: SessionConfig) -> Self {
		let snapshot = TextFile::untitled(config.default_encoding, config.default_line_ending);
		Self::with_surface(fs, config, PlainTextSurface::default(), snapshot, None)
	}

	/// Reads `file` and starts polling it.
	pub async fn open(fs: Arc<dyn FileSystem>, config: SessionConfig, file: FileRef) -> Result<Self> {
		Self::open_with_surface(fs, config, PlainTextSurface::default(), file).await
	}
}

impl<S: TextSurface> DocumentSession<S> {
	/// Session over `surface`, baselined on `snapshot`. Does not start polling.
	pub fn with_surface(
		fs: Arc<dyn FileSystem>,
		config: SessionConfig,
		mut surface: S,
		snapshot: TextFile,
		file: Option<FileRef>,
	) -> Self {
		let snapshots = SnapshotStore::new(snapshot.clone());
		let state = Reinit::new(snapshot, file)
			.clear_undo(true)
			.apply(&mut surface, &snapshots, &SessionState::default());
		Self {
			fs,
			poller: FilePoller::new(config.poll),
			config,
			surface,
			snapshots,
			state,
			mode: EditorMode::Editing,
			placeholder: DEFAULT_PLACEHOLDER.to_string(),
			events: EventBus::new(),
			lifetime: GenerationClock::new().issue(),
			closed: false,
		}
	}

	/// Reads `file` into `surface` and starts polling it.
	pub async fn open_with_surface(fs: Arc<dyn FileSystem>, config: SessionConfig, surface: S, file: FileRef) -> Result<Self> {
		let snapshot = fs.read(&file, None).await?;
		tracing::info!(
			path = %file.path().display(),
			encoding = %snapshot.encoding(),
			line_ending = %snapshot.line_ending(),
			"session.open"
		);
		let mut session = Self::with_surface(fs, config, surface, snapshot, Some(file));
		session.start_polling();
		Ok(session)
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn snapshot(&self) -> Arc<TextFile> {
		self.snapshots.load()
	}

	pub fn editing_file(&self) -> Option<&FileRef> {
		self.state.editing_file.as_ref()
	}

	pub fn file_modification_state(&self) -> FileModificationState {
		self.state.file_modification_state
	}

	pub fn is_loaded(&self) -> bool {
		self.state.loaded
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	pub fn mode(&self) -> EditorMode {
		self.mode
	}

	/// Display name: the backing file's name, else the placeholder.
	pub fn display_name(&self) -> String {
		self.state
			.editing_file
			.as_ref()
			.map_or_else(|| self.placeholder.clone(), FileRef::name)
	}

	pub fn placeholder(&self) -> &str {
		&self.placeholder
	}

	pub fn text(&self) -> Cow<'_, str> {
		self.surface.text()
	}

	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// Direct surface access. Call [`Self::on_text_changed`] after editing.
	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + Send + 'static) -> SubscriptionId {
		self.events.subscribe(listener)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.events.unsubscribe(id)
	}

	/// Shows a diff of live text against the snapshot.
	///
	/// No-op when already previewing or when there is nothing to compare.
	pub fn open_diff_preview(&mut self) -> bool {
		if self.mode == EditorMode::DiffPreview || self.surface.text() == self.snapshots.load().content() {
			return false;
		}
		self.set_mode(EditorMode::DiffPreview);
		true
	}

	pub fn close_diff_preview(&mut self) -> bool {
		if self.mode != EditorMode::DiffPreview {
			return false;
		}
		self.set_mode(EditorMode::Editing);
		true
	}

	/// Renames the backing file, or the placeholder of an unsaved document.
	pub async fn rename(&mut self, new_name: &str) -> Result<()> {
		self.ensure_open()?;
		match self.state.editing_file.clone() {
			None => {
				scribe_fs::validate_file_name(new_name)?;
				self.placeholder = new_name.trim().to_string();
			}
			Some(file) => {
				let renamed = self.fs.rename(&file, new_name).await?;
				tracing::info!(from = %file.path().display(), to = %renamed.path().display(), "session.rename");
				self.state.editing_file = Some(renamed);
				if self.poller.is_polling() {
					self.start_polling();
				}
			}
		}
		self.emit(SessionEvent::FileRenamed);
		Ok(())
	}

	/// Tears the session down. Idempotent.
	///
	/// Stops the poller, closes the check gate, and drops every subscriber.
	pub fn close(&mut self) {
		if self.closed {
			return;
		}
		self.closed = true;
		self.lifetime.cancel();
		self.poller.shutdown();
		self.events.clear();
		tracing::debug!(name = %self.display_name(), "session.close");
	}

	pub(crate) fn ensure_open(&self) -> Result<()> {
		if self.closed { Err(SessionError::Closed) } else { Ok(()) }
	}

	pub(crate) fn emit(&mut self, event: SessionEvent) {
		if !self.closed {
			self.events.emit(event);
		}
	}

	fn set_mode(&mut self, mode: EditorMode) {
		self.mode = mode;
		self.emit(SessionEvent::ModeChanged(mode));
	}

	/// Applies `reinit` and swaps in the resulting state.
	pub(crate) fn reinit(&mut self, reinit: Reinit) {
		let was_modified = self.state.is_modified;
		self.state.loaded = false;
		self.state.is_modified = false;
		let next = reinit.apply(&mut self.surface, &self.snapshots, &self.state);
		self.state = next;
		if self.state.is_modified != was_modified {
			self.emit(SessionEvent::ModificationStateChanged);
		}
	}
}

impl<S: TextSurface> Drop for DocumentSession<S> {
	fn drop(&mut self) {
		self.close();
	}
}
