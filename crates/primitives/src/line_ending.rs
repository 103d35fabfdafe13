use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Line-ending name that is not one of `CRLF`, `CR`, or `LF`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown line ending: {0} (expected CRLF, CR or LF)")]
pub struct UnknownLineEnding(pub String);

/// Line terminator used when a document is written to disk.
///
/// Document text is kept with `\n` separators in memory; the line ending is
/// only materialized by [`LineEnding::apply`] at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum LineEnding {
	/// `\r\n`
	Crlf,
	/// `\r`
	Cr,
	/// `\n`
	#[default]
	Lf,
}

impl LineEnding {
	/// Platform convention for new documents.
	pub const fn native() -> Self {
		if cfg!(windows) { Self::Crlf } else { Self::Lf }
	}

	/// The terminator bytes.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Crlf => "\r\n",
			Self::Cr => "\r",
			Self::Lf => "\n",
		}
	}

	/// Display name, also accepted by [`FromStr`].
	pub const fn name(self) -> &'static str {
		match self {
			Self::Crlf => "CRLF",
			Self::Cr => "CR",
			Self::Lf => "LF",
		}
	}

	/// Detects the terminator of the first line break in `text`.
	///
	/// Text without any line break reports `None`.
	pub fn detect(text: &str) -> Option<Self> {
		let idx = text.find(['\r', '\n'])?;
		let bytes = text.as_bytes();
		Some(match bytes[idx] {
			b'\n' => Self::Lf,
			_ if bytes.get(idx + 1) == Some(&b'\n') => Self::Crlf,
			_ => Self::Cr,
		})
	}

	/// Rewrites every `\r\n` and lone `\r` as `\n`.
	pub fn normalize(text: &str) -> Cow<'_, str> {
		if !text.contains('\r') {
			return Cow::Borrowed(text);
		}
		let mut normalized = String::with_capacity(text.len());
		let mut chars = text.chars().peekable();
		while let Some(ch) = chars.next() {
			if ch == '\r' {
				if chars.peek() == Some(&'\n') {
					chars.next();
				}
				normalized.push('\n');
			} else {
				normalized.push(ch);
			}
		}
		Cow::Owned(normalized)
	}

	/// Rewrites every line break in `text` as this terminator.
	pub fn apply(self, text: &str) -> Cow<'_, str> {
		let normalized = Self::normalize(text);
		match self {
			Self::Lf => normalized,
			other => Cow::Owned(normalized.replace('\n', other.as_str())),
		}
	}
}

impl fmt::Display for LineEnding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for LineEnding {
	type Err = UnknownLineEnding;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"CRLF" => Ok(Self::Crlf),
			"CR" => Ok(Self::Cr),
			"LF" => Ok(Self::Lf),
			_ => Err(UnknownLineEnding(s.to_string())),
		}
	}
}

impl TryFrom<String> for LineEnding {
	type Error = UnknownLineEnding;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<LineEnding> for &'static str {
	fn from(value: LineEnding) -> Self {
		value.name()
	}
}
