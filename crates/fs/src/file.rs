use std::path::{Path, PathBuf};
use std::time::SystemTime;

use scribe_primitives::{LineEnding, TextEncoding};

/// Identity of a backing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
	path: PathBuf,
}

impl FileRef {
	/// Creates a reference to `path`. The file need not exist.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Full path of the file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Final path component, lossily converted for display.
	pub fn name(&self) -> String {
		self.path
			.file_name()
			.map_or_else(|| self.path.to_string_lossy().into_owned(), |name| name.to_string_lossy().into_owned())
	}

	/// Sibling path with the final component replaced by `name`.
	pub fn sibling(&self, name: &str) -> Self {
		Self::new(self.path.with_file_name(name))
	}
}

impl From<PathBuf> for FileRef {
	fn from(path: PathBuf) -> Self {
		Self::new(path)
	}
}

impl From<&Path> for FileRef {
	fn from(path: &Path) -> Self {
		Self::new(path)
	}
}

/// Document state as read from or written to disk.
///
/// Content always uses `\n` separators; the on-disk terminator is recorded in
/// [`TextFile::line_ending`]. Values are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
	content: String,
	encoding: TextEncoding,
	line_ending: LineEnding,
	modified_time: i64,
}

impl TextFile {
	/// Builds a text file value, normalizing line breaks in `content`.
	pub fn new(content: impl Into<String>, encoding: TextEncoding, line_ending: LineEnding, modified_time: i64) -> Self {
		let content = content.into();
		let content = match LineEnding::normalize(&content) {
			std::borrow::Cow::Borrowed(_) => content,
			std::borrow::Cow::Owned(normalized) => normalized,
		};
		Self {
			content,
			encoding,
			line_ending,
			modified_time,
		}
	}

	/// Empty document that has never touched disk.
	pub fn untitled(encoding: TextEncoding, line_ending: LineEnding) -> Self {
		Self::new(String::new(), encoding, line_ending, 0)
	}

	/// Decodes raw file bytes.
	///
	/// `forced` overrides encoding detection. Text without any line break
	/// takes `fallback_line_ending`.
	pub fn decode(bytes: &[u8], forced: Option<TextEncoding>, fallback_line_ending: LineEnding, modified_time: i64) -> Self {
		let encoding = forced.unwrap_or_else(|| TextEncoding::detect(bytes));
		let (text, had_errors) = encoding.decode(bytes);
		if had_errors {
			tracing::debug!(encoding = %encoding, "fs.decode.replaced_malformed");
		}
		let line_ending = LineEnding::detect(&text).unwrap_or(fallback_line_ending);
		Self::new(text, encoding, line_ending, modified_time)
	}

	/// Bytes to write for `content` in this file's encoding and line ending.
	pub fn encode(&self) -> Vec<u8> {
		encode_text(&self.line_ending.apply(&self.content), self.encoding)
	}

	/// Text with `\n` separators.
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Encoding of the file on disk.
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// Line terminator of the file on disk.
	pub fn line_ending(&self) -> LineEnding {
		self.line_ending
	}

	/// Modification timestamp in nanoseconds since the Unix epoch.
	pub fn modified_time(&self) -> i64 {
		self.modified_time
	}
}

/// Converts a file-system timestamp to nanoseconds since the Unix epoch.
pub fn file_time(time: SystemTime) -> i64 {
	match time.duration_since(SystemTime::UNIX_EPOCH) {
		Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
		Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |nanos| -nanos),
	}
}

/// Encodes `text` for writing, warning when characters the encoding cannot
/// represent were replaced.
pub(crate) fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
	let (bytes, had_unmappables) = encoding.encode(text);
	if had_unmappables {
		tracing::warn!(encoding = %encoding, "fs.encode.replaced_unmappable");
	}
	bytes
}
