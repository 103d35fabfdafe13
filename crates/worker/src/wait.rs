use std::time::Duration;

use crate::GenerationToken;

/// Result of a cancellable wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
	/// The full duration elapsed.
	Elapsed,
	/// Cancellation was requested before the duration elapsed.
	Cancelled,
}

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// An already-cancelled token returns immediately without sleeping.
pub async fn sleep_or_cancel(token: &GenerationToken, duration: Duration) -> WaitOutcome {
	if token.is_cancelled() {
		return WaitOutcome::Cancelled;
	}
	tokio::select! {
		biased;
		_ = token.cancelled() => WaitOutcome::Cancelled,
		_ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
	}
}
