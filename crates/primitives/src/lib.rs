//! Core value types for document text: encodings and line endings.

/// Text encodings with byte-order-mark awareness.
pub mod encoding;
/// Line-ending detection, normalization, and application.
pub mod line_ending;

pub use encoding::{TextEncoding, UnknownEncoding};
pub use line_ending::{LineEnding, UnknownLineEnding};
