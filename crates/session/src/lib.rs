//! Document session engine.
//!
//! # Purpose
//!
//! Tracks whether an open document diverges from its last-saved snapshot,
//! negotiates pending encoding and line-ending changes, and watches the
//! backing file for out-of-band modification while the document is open.
//!
//! # Mental model
//!
//! ```text
//! user edits ──► DocumentSession ◄── PollUpdate ── FilePoller task
//!                  │  ▲                               │
//!                  │  └── Reinit (save/reload/revert)  │ stat
//!                  ▼                                   ▼
//!               EventBus                         dyn FileSystem
//! ```
//!
//! All state lives on the foreground owner of [`DocumentSession`]. The poller
//! task reads the snapshot timestamp and reports results over a channel; the
//! owner applies them with [`DocumentSession::pump`] or
//! [`DocumentSession::next_poll_update`].
//!
//! # Failure modes
//!
//! Save, reload, and rename return [`SessionError`] and commit nothing on
//! failure. Poll-loop failures are logged and stop the loop.

mod config;
mod error;
mod events;
mod poller;
mod session;
mod snapshot;
mod state;
mod surface;

pub use config::{DEFAULT_INITIAL_DELAY, DEFAULT_POLL_INTERVAL, PollConfig, SessionConfig};
pub use error::{ConfigError, Result, SessionError};
pub use events::{EventBus, SessionEvent, SubscriptionId};
pub use poller::{FilePoller, PollUpdate};
pub use scribe_fs::{FileRef, FileSystem, FsError, LocalFs, MemoryFs, TextFile};
pub use scribe_primitives::{LineEnding, TextEncoding};
pub use session::{DEFAULT_PLACEHOLDER, DocumentSession, SessionMetadata};
pub use snapshot::SnapshotStore;
pub use state::{EditorMode, FileModificationState, SessionState};
pub use surface::{PlainTextSurface, TextSurface};
