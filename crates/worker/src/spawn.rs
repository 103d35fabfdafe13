use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

/// Ambient runtime, else a small shared runtime for callers outside one.
fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static FALLBACK: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = FALLBACK.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("scribe-worker")
			.build()
			.expect("failed to build scribe-worker fallback runtime")
	});
	runtime.handle().clone()
}

/// Spawns a named background task.
///
/// Runs on the current tokio runtime when called from inside one, so paused
/// test clocks apply to the task.
pub fn spawn<F>(task: &'static str, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(task, "worker.spawn");
	runtime_handle().spawn(fut)
}
