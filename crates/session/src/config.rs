//! Session configuration.
//!
//! Configuration is TOML. Every field is optional; omitted fields keep their
//! defaults.
//!
//! ```toml
//! max-file-bytes = 1048576
//! default-encoding = "UTF-8"
//! default-line-ending = "LF"
//!
//! [poll]
//! initial-delay-ms = 300
//! interval-ms = 6000
//! ```
//!
//! The CLI looks for `$XDG_CONFIG_HOME/scribe/config.toml` (or the platform
//! equivalent) when no explicit path is given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use scribe_fs::{DEFAULT_MAX_FILE_BYTES, LocalFs};
use scribe_primitives::{LineEnding, TextEncoding};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default wait between starting the poller and its first check.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(300);
/// Default wait between two scheduled checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// Timing of the background file-status poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PollConfig {
	/// Delay before the first check after (re)start.
	pub initial_delay_ms: u64,
	/// Delay after each check before the next one.
	pub interval_ms: u64,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			initial_delay_ms: DEFAULT_INITIAL_DELAY.as_millis() as u64,
			interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
		}
	}
}

impl PollConfig {
	/// Builds a config from durations, truncated to whole milliseconds.
	pub fn new(initial_delay: Duration, interval: Duration) -> Self {
		Self {
			initial_delay_ms: u64::try_from(initial_delay.as_millis()).unwrap_or(u64::MAX),
			interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
		}
	}

	/// Delay before the first check.
	pub fn initial_delay(&self) -> Duration {
		Duration::from_millis(self.initial_delay_ms)
	}

	/// Delay between checks.
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}
}

/// Configuration for a document session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
	/// Poller timing.
	pub poll: PollConfig,
	/// Largest file the local backend will load.
	pub max_file_bytes: u64,
	/// Encoding of new documents.
	pub default_encoding: TextEncoding,
	/// Line ending of new documents and of files without line breaks.
	pub default_line_ending: LineEnding,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			poll: PollConfig::default(),
			max_file_bytes: DEFAULT_MAX_FILE_BYTES,
			default_encoding: TextEncoding::UTF8,
			default_line_ending: LineEnding::native(),
		}
	}
}

impl SessionConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses the file at `path`.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&source)?;
		tracing::debug!(path = %path.display(), "config.loaded");
		Ok(config)
	}

	/// Platform config file location, if the platform has a config directory.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("scribe").join("config.toml"))
	}

	/// Loads the platform config file, falling back to defaults when absent.
	pub fn load_default() -> Result<Self, ConfigError> {
		match Self::default_path() {
			Some(path) if path.is_file() => Self::load(&path),
			_ => Ok(Self::default()),
		}
	}

	/// Local-disk backend honoring the size cap and default line ending.
	pub fn local_fs(&self) -> LocalFs {
		LocalFs::new()
			.with_max_file_bytes(self.max_file_bytes)
			.with_default_line_ending(self.default_line_ending)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.poll.interval_ms == 0 {
			return Err(ConfigError::Invalid("poll.interval-ms must be greater than zero".into()));
		}
		if self.max_file_bytes == 0 {
			return Err(ConfigError::Invalid("max-file-bytes must be greater than zero".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn defaults_match_documented_timing() {
		let poll = PollConfig::default();
		assert_eq!(poll.initial_delay(), Duration::from_millis(300));
		assert_eq!(poll.interval(), Duration::from_secs(6));
	}

	#[test]
	fn empty_document_is_default() {
		assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
	}

	#[test]
	fn partial_document_overrides_fields() {
		let config = SessionConfig::from_toml_str(
			r#"
default-encoding = "UTF-16 LE BOM"
default-line-ending = "crlf"

[poll]
interval-ms = 1500
"#,
		)
		.unwrap();
		assert_eq!(config.default_encoding, TextEncoding::UTF16_LE);
		assert_eq!(config.default_line_ending, LineEnding::Crlf);
		assert_eq!(config.poll.interval(), Duration::from_millis(1500));
		assert_eq!(config.poll.initial_delay(), DEFAULT_INITIAL_DELAY);
	}

	#[test]
	fn zero_interval_is_rejected() {
		let err = SessionConfig::from_toml_str("[poll]\ninterval-ms = 0").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(SessionConfig::from_toml_str("polling = true"), Err(ConfigError::Toml(_))));
	}

	#[test]
	fn load_reads_file_and_reports_missing_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "max-file-bytes = 10").unwrap();
		assert_eq!(SessionConfig::load(&path).unwrap().max_file_bytes, 10);

		let missing = dir.path().join("missing.toml");
		assert!(matches!(SessionConfig::load(&missing), Err(ConfigError::Io { .. })));
	}
}
