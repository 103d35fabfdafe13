//! Background file-status poller.
//!
//! # Purpose
//!
//! Periodically re-stats the backing file and reports whether it still
//! matches the snapshot timestamp, was rewritten, or disappeared.
//!
//! # Mental model
//!
//! The poller is either Idle or Polling. Polling means one spawned loop task
//! holding a [`GenerationToken`]. Every [`FilePoller::start`] stops the previous
//! generation and issues a fresh one, so at most one live loop exists.
//!
//! The loop never touches session state. It sends [`PollUpdate`]s tagged with
//! its generation over a channel owned by that generation; the session applies
//! them on the foreground task. Stopping a generation drops its receiver, so
//! queued results of a stopped loop are never applied.
//!
//! # Concurrency & ordering
//!
//! Scheduled checks and manual checks share one [`ExclusiveGate`]. A check
//! holds the gate from before its first stat until its result has been handed
//! off, so two checks never interleave their stat and publish steps.
//!
//! Cancellation is observed before acquiring the gate, after acquiring it, and
//! after the stat. Both timed waits and the gate acquisition abort as soon as
//! the token is cancelled.
//!
//! # Failure modes
//!
//! Cancellation and a closed gate end the loop silently. Any file-system
//! error is logged at `warn` and ends the loop; the session keeps its last
//! published state.

use std::sync::Arc;

use scribe_fs::{FileRef, FileSystem};
use scribe_worker::{
	ExclusiveGate, GateAcquire, GatePermit, GenerationClock, GenerationToken, WaitOutcome, sleep_or_cancel,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::PollConfig;
use crate::snapshot::SnapshotStore;
use crate::state::FileModificationState;

#[cfg(test)]
mod tests;

/// Result of one scheduled check, tagged with the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollUpdate {
	pub generation: u64,
	pub state: FileModificationState,
}

/// Everything a status check reads. Cloned into each loop task.
#[derive(Clone)]
pub(crate) struct StatusProbe {
	fs: Arc<dyn FileSystem>,
	file: FileRef,
	snapshots: SnapshotStore,
}

impl StatusProbe {
	pub(crate) fn new(fs: Arc<dyn FileSystem>, file: FileRef, snapshots: SnapshotStore) -> Self {
		Self { fs, file, snapshots }
	}

	/// Stats the file against the current snapshot timestamp.
	pub(crate) async fn stat(&self) -> scribe_fs::Result<FileModificationState> {
		if !self.fs.exists(&self.file).await? {
			return Ok(FileModificationState::RenamedMovedOrDeleted);
		}
		match self.fs.modified_time(&self.file).await {
			Ok(time) if time == self.snapshots.modified_time() => Ok(FileModificationState::Untouched),
			Ok(_) => Ok(FileModificationState::Modified),
			// Deleted between the two stats.
			Err(err) if err.is_not_found() => Ok(FileModificationState::RenamedMovedOrDeleted),
			Err(err) => Err(err),
		}
	}
}

/// Outcome of a gated status check.
#[derive(Debug)]
pub(crate) enum CheckOutcome {
	/// Publish `state`, then drop `permit`.
	Ready {
		state: FileModificationState,
		permit: GatePermit,
	},
	Cancelled,
	Closed,
}

/// One status check under the shared gate.
///
/// On [`CheckOutcome::Ready`] the caller still holds the gate and must
/// publish before releasing it.
pub(crate) async fn check_status(
	probe: &StatusProbe,
	gate: &ExclusiveGate,
	token: &GenerationToken,
) -> scribe_fs::Result<CheckOutcome> {
	if token.is_cancelled() {
		return Ok(CheckOutcome::Cancelled);
	}
	let permit = match gate.acquire(token).await {
		GateAcquire::Acquired(permit) => permit,
		GateAcquire::Cancelled => return Ok(CheckOutcome::Cancelled),
		GateAcquire::Closed => return Ok(CheckOutcome::Closed),
	};
	if token.is_cancelled() {
		return Ok(CheckOutcome::Cancelled);
	}
	let state = probe.stat().await?;
	if token.is_cancelled() {
		return Ok(CheckOutcome::Cancelled);
	}
	Ok(CheckOutcome::Ready { state, permit })
}

#[derive(Debug)]
struct ActivePoll {
	token: GenerationToken,
	task: JoinHandle<()>,
	updates: mpsc::UnboundedReceiver<PollUpdate>,
}

/// Owner of the poll loop and the gate it shares with manual checks.
#[derive(Debug)]
pub struct FilePoller {
	config: PollConfig,
	clock: GenerationClock,
	gate: ExclusiveGate,
	active: Option<ActivePoll>,
}

impl FilePoller {
	pub fn new(config: PollConfig) -> Self {
		Self {
			config,
			clock: GenerationClock::new(),
			gate: ExclusiveGate::new(),
			active: None,
		}
	}

	pub fn config(&self) -> PollConfig {
		self.config
	}

	pub(crate) fn gate(&self) -> &ExclusiveGate {
		&self.gate
	}

	/// Stops any running loop and spawns a new generation.
	///
	/// Returns the new generation, or `None` once the gate is closed.
	pub(crate) fn start(&mut self, probe: StatusProbe) -> Option<u64> {
		self.stop();
		if self.gate.is_closed() {
			return None;
		}
		let token = self.clock.issue();
		let generation = token.generation();
		tracing::debug!(generation, file = %probe.file.path().display(), "poller.start");
		let (tx, updates) = mpsc::unbounded_channel();
		let task = scribe_worker::spawn("file-poller", run(probe, self.gate.clone(), token.clone(), self.config, tx));
		self.active = Some(ActivePoll { token, task, updates });
		Some(generation)
	}

	/// Requests cancellation of the running loop and drops its pending updates. Idempotent.
	pub fn stop(&mut self) {
		if let Some(active) = self.active.take()
			&& !active.token.is_cancelled()
		{
			tracing::debug!(generation = active.token.generation(), "poller.stop");
			active.token.cancel();
		}
	}

	/// Whether a loop is running and not cancelled.
	pub fn is_polling(&self) -> bool {
		self.active
			.as_ref()
			.is_some_and(|active| !active.token.is_cancelled() && !active.task.is_finished())
	}

	/// Generation of the current loop, if any.
	pub fn generation(&self) -> Option<u64> {
		self.active.as_ref().map(|active| active.token.generation())
	}

	/// Whether updates from `generation` may still be applied.
	pub fn is_live(&self, generation: u64) -> bool {
		self.active
			.as_ref()
			.is_some_and(|active| active.token.generation() == generation && !active.token.is_cancelled())
	}

	pub(crate) fn try_recv(&mut self) -> Option<PollUpdate> {
		self.active.as_mut()?.updates.try_recv().ok()
	}

	/// Next update of the current generation.
	///
	/// Returns `None` once the loop has exited and its queue is drained, or
	/// immediately when Idle.
	pub(crate) async fn recv(&mut self) -> Option<PollUpdate> {
		self.active.as_mut()?.updates.recv().await
	}

	/// Stops the loop and closes the gate so no later check can acquire it.
	pub fn shutdown(&mut self) {
		self.stop();
		self.gate.close();
	}
}

impl Drop for FilePoller {
	fn drop(&mut self) {
		self.shutdown();
	}
}

async fn run(
	probe: StatusProbe,
	gate: ExclusiveGate,
	token: GenerationToken,
	config: PollConfig,
	tx: mpsc::UnboundedSender<PollUpdate>,
) {
	let generation = token.generation();
	if sleep_or_cancel(&token, config.initial_delay()).await == WaitOutcome::Cancelled {
		tracing::trace!(generation, "poller.cancelled");
		return;
	}
	loop {
		match check_status(&probe, &gate, &token).await {
			Ok(CheckOutcome::Ready { state, permit }) => {
				tracing::trace!(generation, ?state, "poller.check");
				let sent = tx.send(PollUpdate { generation, state });
				drop(permit);
				if sent.is_err() {
					break;
				}
			}
			Ok(CheckOutcome::Cancelled | CheckOutcome::Closed) => break,
			Err(err) => {
				tracing::warn!(generation, file = %probe.file.path().display(), error = %err, "poller.failed");
				break;
			}
		}
		if sleep_or_cancel(&token, config.interval()).await == WaitOutcome::Cancelled {
			break;
		}
	}
	tracing::trace!(generation, "poller.exit");
}
