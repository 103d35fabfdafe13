use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Encoding name that matched neither a known variant nor a WHATWG label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown text encoding: {0}")]
pub struct UnknownEncoding(pub String);

/// A character encoding plus whether files carry a byte-order mark.
///
/// Two encodings compare equal only when both the underlying codec and the
/// BOM flag agree, so `UTF-8` and `UTF-8-BOM` are distinct choices for a
/// document even though they decode identically.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
	codec: &'static Encoding,
	bom: bool,
}

impl TextEncoding {
	/// UTF-8 without a byte-order mark.
	pub const UTF8: Self = Self::new(encoding_rs::UTF_8, false);
	/// UTF-8 with a leading `EF BB BF`.
	pub const UTF8_BOM: Self = Self::new(encoding_rs::UTF_8, true);
	/// Little-endian UTF-16 with a leading `FF FE`.
	pub const UTF16_LE: Self = Self::new(encoding_rs::UTF_16LE, true);
	/// Big-endian UTF-16 with a leading `FE FF`.
	pub const UTF16_BE: Self = Self::new(encoding_rs::UTF_16BE, true);
	/// Fallback single-byte encoding for bytes that are not valid UTF-8.
	pub const WINDOWS_1252: Self = Self::new(encoding_rs::WINDOWS_1252, false);

	/// Creates an encoding from a codec and BOM flag.
	pub const fn new(codec: &'static Encoding, bom: bool) -> Self {
		Self { codec, bom }
	}

	/// Returns the underlying codec.
	pub const fn codec(self) -> &'static Encoding {
		self.codec
	}

	/// Returns whether written files start with a byte-order mark.
	pub const fn has_bom(self) -> bool {
		self.bom
	}

	/// Detects a byte-order mark at the start of `bytes`.
	pub fn sniff_bom(bytes: &[u8]) -> Option<Self> {
		Encoding::for_bom(bytes).map(|(codec, _)| Self::new(codec, true))
	}

	/// Picks the encoding of raw file bytes.
	///
	/// A byte-order mark wins; otherwise valid UTF-8 is UTF-8 and anything
	/// else falls back to Windows-1252.
	pub fn detect(bytes: &[u8]) -> Self {
		if let Some(encoding) = Self::sniff_bom(bytes) {
			return encoding;
		}
		if std::str::from_utf8(bytes).is_ok() {
			Self::UTF8
		} else {
			Self::WINDOWS_1252
		}
	}

	/// Decodes `bytes`, dropping a BOM that matches this encoding.
	///
	/// Returns the text and whether malformed sequences were replaced.
	pub fn decode(self, bytes: &[u8]) -> (String, bool) {
		let (text, had_errors) = self.codec.decode_with_bom_removal(bytes);
		(text.into_owned(), had_errors)
	}

	/// Encodes `text`, prefixing the byte-order mark when this encoding has one.
	///
	/// Returns the bytes and whether unmappable characters were replaced
	/// with numeric character references.
	///
	/// UTF-16 is produced directly because `encoding_rs` only encodes to
	/// ASCII-compatible targets.
	pub fn encode(self, text: &str) -> (Vec<u8>, bool) {
		let mut out = Vec::with_capacity(text.len() + 3);
		if self.codec == encoding_rs::UTF_16LE {
			if self.bom {
				out.extend_from_slice(&[0xFF, 0xFE]);
			}
			for unit in text.encode_utf16() {
				out.extend_from_slice(&unit.to_le_bytes());
			}
			return (out, false);
		}
		if self.codec == encoding_rs::UTF_16BE {
			if self.bom {
				out.extend_from_slice(&[0xFE, 0xFF]);
			}
			for unit in text.encode_utf16() {
				out.extend_from_slice(&unit.to_be_bytes());
			}
			return (out, false);
		}
		if self.bom && self.codec == encoding_rs::UTF_8 {
			out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
		}
		let (bytes, _, had_unmappables) = self.codec.encode(text);
		out.extend_from_slice(&bytes);
		(out, had_unmappables)
	}

	/// Display name, also accepted by [`FromStr`].
	pub fn name(self) -> Cow<'static, str> {
		match (self.codec.name(), self.bom) {
			("UTF-8", false) => Cow::Borrowed("UTF-8"),
			("UTF-8", true) => Cow::Borrowed("UTF-8-BOM"),
			("UTF-16LE", true) => Cow::Borrowed("UTF-16 LE BOM"),
			("UTF-16BE", true) => Cow::Borrowed("UTF-16 BE BOM"),
			(name, false) => Cow::Borrowed(name),
			(name, true) => Cow::Owned(format!("{name} BOM")),
		}
	}
}

impl Default for TextEncoding {
	fn default() -> Self {
		Self::UTF8
	}
}

impl fmt::Debug for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TextEncoding({})", self.name())
	}
}

impl fmt::Display for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name())
	}
}

impl FromStr for TextEncoding {
	type Err = UnknownEncoding;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let (label, bom) = match trimmed.strip_suffix("BOM").or_else(|| trimmed.strip_suffix("bom")) {
			Some(rest) => (rest.trim_end_matches(['-', ' ']), true),
			None => (trimmed, false),
		};
		let normalized = label.replace(' ', "");
		let codec = Encoding::for_label(normalized.as_bytes()).ok_or_else(|| UnknownEncoding(s.to_string()))?;
		// UTF-16 files are only recognised through their BOM, so a bare label implies one.
		let bom = bom || codec == encoding_rs::UTF_16LE || codec == encoding_rs::UTF_16BE;
		Ok(Self::new(codec, bom))
	}
}

impl Serialize for TextEncoding {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.name())
	}
}

impl<'de> Deserialize<'de> for TextEncoding {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let name = String::deserialize(deserializer)?;
		name.parse().map_err(serde::de::Error::custom)
	}
}
