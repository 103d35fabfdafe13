use scribe_primitives::{LineEnding, TextEncoding};
use serde::{Deserialize, Serialize};

use crate::state::EditorMode;
use crate::surface::TextSurface;

use super::DocumentSession;

/// Persistable session state, used to restore open documents across restarts.
///
/// Content itself is stored separately by the embedder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
	pub file_name_placeholder: String,
	pub last_saved_encoding: TextEncoding,
	pub last_saved_line_ending: LineEnding,
	pub date_modified_file_time: i64,
	pub has_editing_file: bool,
	pub is_modified: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requested_encoding: Option<TextEncoding>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requested_line_ending: Option<LineEnding>,
	#[serde(default)]
	pub is_in_diff_preview_mode: bool,
}

impl<S: TextSurface> DocumentSession<S> {
	pub fn metadata(&self) -> SessionMetadata {
		let snapshot = self.snapshots.load();
		SessionMetadata {
			file_name_placeholder: self.placeholder.clone(),
			last_saved_encoding: snapshot.encoding(),
			last_saved_line_ending: snapshot.line_ending(),
			date_modified_file_time: snapshot.modified_time(),
			has_editing_file: self.state.editing_file.is_some(),
			is_modified: self.state.is_modified,
			requested_encoding: self.state.requested_encoding,
			requested_line_ending: self.state.requested_line_ending,
			is_in_diff_preview_mode: self.mode == EditorMode::DiffPreview,
		}
	}

	/// Replays persisted overrides and, if given, the persisted live text.
	///
	/// A persisted modified flag is kept even when the surface content was
	/// restored by the embedder beforehand. Undo history is cleared afterwards
	/// so the restored state is the oldest reachable one.
	pub fn restore_metadata(&mut self, metadata: &SessionMetadata, new_text: Option<&str>) {
		if self.closed {
			return;
		}
		if let Some(encoding) = metadata.requested_encoding {
			self.request_encoding(encoding);
		}
		if let Some(line_ending) = metadata.requested_line_ending {
			self.request_line_ending(line_ending);
		}
		if let Some(text) = new_text {
			self.surface.set_text(text);
			self.on_text_changed();
		}
		if metadata.is_modified {
			self.set_modified(true);
		}
		if self.state.editing_file.is_none() && !metadata.file_name_placeholder.is_empty() {
			self.placeholder = metadata.file_name_placeholder.clone();
		}
		self.surface.clear_undo_history();
	}
}
