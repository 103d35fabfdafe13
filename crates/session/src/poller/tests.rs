use std::time::Duration;

use scribe_fs::{MemoryFs, TextFile};
use scribe_primitives::{LineEnding, TextEncoding};

use super::*;

const PATH: &str = "/notes.txt";

fn fixture(mtime: i64) -> (MemoryFs, StatusProbe) {
	let fs = MemoryFs::new();
	fs.insert_with_time(PATH, "A", mtime);
	let snapshots = SnapshotStore::new(TextFile::new("A", TextEncoding::UTF8, LineEnding::Lf, mtime));
	let probe = StatusProbe::new(Arc::new(fs.clone()), FileRef::new(PATH), snapshots);
	(fs, probe)
}

fn default_timing() -> PollConfig {
	PollConfig::new(Duration::from_millis(300), Duration::from_secs(6))
}

#[tokio::test]
async fn stat_classifies_file_state() {
	let (fs, probe) = fixture(100);
	assert_eq!(probe.stat().await.unwrap(), FileModificationState::Untouched);
	fs.set_modified_time(PATH, 200);
	assert_eq!(probe.stat().await.unwrap(), FileModificationState::Modified);
	fs.remove(PATH);
	assert_eq!(probe.stat().await.unwrap(), FileModificationState::RenamedMovedOrDeleted);
}

#[tokio::test]
async fn check_honors_cancellation_before_gate() {
	let (fs, probe) = fixture(1);
	let gate = ExclusiveGate::new();
	let token = GenerationClock::new().issue();
	token.cancel();
	let outcome = check_status(&probe, &gate, &token).await.unwrap();
	assert!(matches!(outcome, CheckOutcome::Cancelled));
	assert_eq!(fs.stat_count(), 0);
	assert!(gate.is_free());
}

#[tokio::test(start_paused = true)]
async fn check_cancelled_during_stat_releases_gate_without_result() {
	let (fs, probe) = fixture(1);
	fs.set_stat_delay(Duration::from_millis(100));
	let gate = ExclusiveGate::new();
	let token = GenerationClock::new().issue();

	let task = {
		let gate = gate.clone();
		let token = token.clone();
		tokio::spawn(async move { matches!(check_status(&probe, &gate, &token).await, Ok(CheckOutcome::Cancelled)) })
	};
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert!(!gate.is_free());
	token.cancel();
	assert_eq!(task.await.ok(), Some(true));
	assert!(gate.is_free());
}

#[tokio::test]
async fn ready_check_holds_gate_until_permit_dropped() {
	let (_fs, probe) = fixture(1);
	let gate = ExclusiveGate::new();
	let token = GenerationClock::new().issue();
	let CheckOutcome::Ready { state, permit } = check_status(&probe, &gate, &token).await.unwrap() else {
		panic!("expected a ready check");
	};
	assert_eq!(state, FileModificationState::Untouched);
	assert!(!gate.is_free());
	drop(permit);
	assert!(gate.is_free());
}

#[tokio::test]
async fn closed_gate_ends_check() {
	let (_fs, probe) = fixture(1);
	let gate = ExclusiveGate::new();
	gate.close();
	let token = GenerationClock::new().issue();
	assert!(matches!(check_status(&probe, &gate, &token).await.unwrap(), CheckOutcome::Closed));
}

#[tokio::test(start_paused = true)]
async fn loop_waits_initial_delay_then_interval() {
	let (fs, probe) = fixture(1);
	let mut poller = FilePoller::new(default_timing());
	let generation = poller.start(probe).unwrap();
	let started = tokio::time::Instant::now();

	let first = poller.recv().await.unwrap();
	assert_eq!(first, PollUpdate { generation, state: FileModificationState::Untouched });
	let elapsed = started.elapsed();
	assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400), "{elapsed:?}");

	fs.set_modified_time(PATH, 2);
	let second = poller.recv().await.unwrap();
	assert_eq!(second.state, FileModificationState::Modified);
	let elapsed = started.elapsed();
	assert!(elapsed >= Duration::from_millis(6300) && elapsed < Duration::from_millis(6400), "{elapsed:?}");
	assert!(poller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_safe_when_idle() {
	let (_fs, probe) = fixture(1);
	let mut poller = FilePoller::new(default_timing());
	poller.stop();
	assert!(!poller.is_polling());

	let generation = poller.start(probe).unwrap();
	assert!(poller.is_live(generation));
	poller.stop();
	poller.stop();
	assert!(!poller.is_polling());
	assert!(!poller.is_live(generation));
	assert_eq!(poller.generation(), None);
}

#[tokio::test(start_paused = true)]
async fn stop_aborts_wait_without_publishing() {
	let (fs, probe) = fixture(1);
	let mut poller = FilePoller::new(default_timing());
	poller.start(probe);
	tokio::time::sleep(Duration::from_millis(100)).await;
	poller.stop();
	tokio::time::sleep(Duration::from_secs(30)).await;
	assert!(poller.try_recv().is_none());
	assert_eq!(fs.stat_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_supersedes_previous_generation() {
	let (_fs, probe) = fixture(1);
	let mut poller = FilePoller::new(default_timing());
	let first = poller.start(probe.clone()).unwrap();
	let second = poller.start(probe).unwrap();
	assert!(second > first);
	assert!(!poller.is_live(first));
	assert!(poller.is_live(second));

	let update = poller.recv().await.unwrap();
	assert_eq!(update.generation, second);
}

#[tokio::test(start_paused = true)]
async fn stat_failure_ends_loop() {
	let (fs, probe) = fixture(1);
	fs.fail_stats(true);
	let mut poller = FilePoller::new(default_timing());
	poller.start(probe);
	tokio::time::sleep(Duration::from_secs(1)).await;
	assert!(!poller.is_polling());
	assert!(poller.try_recv().is_none());
	assert_eq!(fs.stat_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_refuses_restart() {
	let (_fs, probe) = fixture(1);
	let mut poller = FilePoller::new(default_timing());
	poller.shutdown();
	assert!(poller.gate().is_closed());
	assert_eq!(poller.start(probe), None);
	assert!(!poller.is_polling());
}
