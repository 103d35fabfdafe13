//! Session behavior against the real disk.

use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use scribe_session::{
	DocumentSession, FileModificationState, FileRef, LineEnding, PollConfig, SessionConfig, SessionError, TextEncoding,
};

fn config() -> SessionConfig {
	SessionConfig {
		poll: PollConfig::new(Duration::from_millis(10), Duration::from_millis(50)),
		default_line_ending: LineEnding::Lf,
		..SessionConfig::default()
	}
}

async fn open(path: &std::path::Path) -> DocumentSession {
	let config = config();
	let fs = Arc::new(config.local_fs());
	DocumentSession::open(fs, config, FileRef::new(path)).await.unwrap()
}

async fn wait_for(session: &mut DocumentSession, wanted: FileModificationState) {
	let deadline = Duration::from_secs(5);
	tokio::time::timeout(deadline, async {
		while let Some(state) = session.next_poll_update().await {
			if state == wanted {
				return;
			}
		}
		panic!("poller stopped before reporting {wanted:?}");
	})
	.await
	.expect("poll update timed out");
}

#[tokio::test]
async fn open_edit_save_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("notes.txt");
	std::fs::write(&path, b"first\r\nsecond\r\n").unwrap();

	let mut session = open(&path).await;
	assert_eq!(session.text(), "first\nsecond\n");
	assert_eq!(session.current_line_ending(), LineEnding::Crlf);

	session.edit(|surface| surface.insert(0, "zeroth\n"));
	session.request_encoding(TextEncoding::UTF8_BOM);
	session.save_in_place().await.unwrap();

	let bytes = std::fs::read(&path).unwrap();
	assert_eq!(bytes, b"\xEF\xBB\xBFzeroth\r\nfirst\r\nsecond\r\n");
	assert!(!session.is_modified());
	wait_for(&mut session, FileModificationState::Untouched).await;
}

#[tokio::test]
async fn external_changes_are_detected() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("watched.txt");
	std::fs::write(&path, "A").unwrap();

	let mut session = open(&path).await;
	let later = SystemTime::now() + Duration::from_secs(60);
	File::options().write(true).open(&path).unwrap().set_modified(later).unwrap();
	wait_for(&mut session, FileModificationState::Modified).await;
	assert_eq!(session.file_modification_state(), FileModificationState::Modified);

	std::fs::remove_file(&path).unwrap();
	wait_for(&mut session, FileModificationState::RenamedMovedOrDeleted).await;

	session.save_in_place().await.unwrap();
	assert_eq!(session.file_modification_state(), FileModificationState::Untouched);
	assert_eq!(std::fs::read_to_string(&path).unwrap(), "A");
}

#[tokio::test]
async fn save_into_missing_directory_fails_cleanly() {
	let dir = tempfile::tempdir().unwrap();
	let mut session = DocumentSession::new_untitled(Arc::new(config().local_fs()), config());
	session.edit(|surface| surface.insert(0, "draft"));

	let target = FileRef::new(dir.path().join("missing").join("draft.txt"));
	assert!(matches!(session.save(target).await, Err(SessionError::Fs(_))));
	assert!(session.is_modified());
	assert!(session.editing_file().is_none());
}

#[tokio::test]
async fn oversized_file_is_refused() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("big.txt");
	std::fs::write(&path, "0123456789").unwrap();
	let config = SessionConfig {
		max_file_bytes: 4,
		..config()
	};
	let result = DocumentSession::open(Arc::new(config.local_fs()), config, FileRef::new(&path)).await;
	assert!(matches!(result, Err(SessionError::Fs(scribe_session::FsError::TooLarge { len: 10, .. }))));
}
