//! Scribe command-line front end.
//!
//! - `watch` keeps a document session open and reports out-of-band changes
//!   to the file until interrupted.
//! - `convert` rewrites a file with a different encoding or line ending
//!   through a normal session save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_session::{
	DocumentSession, FileModificationState, FileRef, LineEnding, SessionConfig, SessionEvent, TextEncoding,
};
use tracing::{info, warn};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Watch text files for external changes and convert their encoding")]
struct Args {
	/// Configuration file (defaults to the platform config directory)
	#[arg(short, long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Open FILE and report when it is modified, moved, or deleted on disk
	Watch {
		/// File to watch
		file: PathBuf,
	},
	/// Rewrite FILE with another encoding and/or line ending
	Convert {
		/// File to convert in place
		file: PathBuf,

		/// Target encoding, e.g. "UTF-8", "UTF-8-BOM", "UTF-16 LE"
		#[arg(short, long, value_name = "NAME")]
		encoding: Option<TextEncoding>,

		/// Target line ending: LF, CRLF or CR
		#[arg(short, long, value_name = "ENDING")]
		line_ending: Option<LineEnding>,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = load_config(args.config.as_deref())?;

	match args.command {
		Command::Watch { file } => watch(config, &file).await,
		Command::Convert {
			file,
			encoding,
			line_ending,
		} => convert(config, &file, encoding, line_ending).await,
	}
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
	match path {
		Some(path) => SessionConfig::load(path).with_context(|| format!("failed to load config {}", path.display())),
		None => SessionConfig::load_default().context("failed to load default config"),
	}
}

async fn open(config: SessionConfig, path: &Path) -> Result<DocumentSession> {
	let fs = Arc::new(config.local_fs());
	DocumentSession::open(fs, config, FileRef::new(path))
		.await
		.with_context(|| format!("failed to open {}", path.display()))
}

fn describe(state: FileModificationState) -> &'static str {
	match state {
		FileModificationState::Untouched => "unchanged on disk",
		FileModificationState::Modified => "modified on disk",
		FileModificationState::RenamedMovedOrDeleted => "renamed, moved or deleted",
	}
}

async fn watch(config: SessionConfig, path: &Path) -> Result<()> {
	let mut session = open(config, path).await?;
	let name = session.display_name();
	session.subscribe(move |event| {
		if let SessionEvent::FileModificationStateChanged(state) = event {
			println!("{name}: {}", describe(*state));
		}
	});

	info!(
		path = %path.display(),
		encoding = %session.current_encoding(),
		line_ending = %session.current_line_ending(),
		interval_ms = session.config().poll.interval_ms,
		"watching"
	);

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {
				info!("interrupted");
				break;
			}
			update = session.next_poll_update() => {
				if update.is_none() {
					warn!(path = %path.display(), "poller stopped");
					break;
				}
			}
		}
	}

	session.close();
	Ok(())
}

async fn convert(
	config: SessionConfig,
	path: &Path,
	encoding: Option<TextEncoding>,
	line_ending: Option<LineEnding>,
) -> Result<()> {
	if encoding.is_none() && line_ending.is_none() {
		anyhow::bail!("nothing to convert: pass --encoding and/or --line-ending");
	}

	let mut session = open(config, path).await?;
	let mut changed = false;
	if let Some(encoding) = encoding {
		changed |= session.request_encoding(encoding);
	}
	if let Some(line_ending) = line_ending {
		changed |= session.request_line_ending(line_ending);
	}

	if changed {
		session
			.save_in_place()
			.await
			.with_context(|| format!("failed to write {}", path.display()))?;
		println!(
			"{}: converted to {} / {}",
			path.display(),
			session.current_encoding(),
			session.current_line_ending()
		);
	} else {
		println!(
			"{}: already {} / {}",
			path.display(),
			session.current_encoding(),
			session.current_line_ending()
		);
	}

	session.close();
	Ok(())
}

/// `SCRIBE_LOG`, then `RUST_LOG`, then a default chosen by `--verbose`.
fn log_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
	use tracing_subscriber::EnvFilter;

	EnvFilter::try_from_env("SCRIBE_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("scribe=trace,scribe_session=trace,scribe_fs=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		})
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::prelude::*;

	let filter = || log_filter(verbose);

	// SCRIBE_LOG_DIR sends logs to a per-process file instead of stderr.
	if let Some(log_dir) = std::env::var("SCRIBE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("scribe.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::registry()
		.with(filter())
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn convert_parses_encoding_and_line_ending() {
		let args = Args::try_parse_from(["scribe", "convert", "a.txt", "--encoding", "UTF-16 LE", "-l", "crlf"]).unwrap();
		let Command::Convert {
			file,
			encoding,
			line_ending,
		} = args.command
		else {
			panic!("expected convert");
		};
		assert_eq!(file, PathBuf::from("a.txt"));
		assert_eq!(encoding, Some(TextEncoding::UTF16_LE));
		assert_eq!(line_ending, Some(LineEnding::Crlf));
	}

	#[test]
	fn unknown_encoding_is_rejected() {
		assert!(Args::try_parse_from(["scribe", "convert", "a.txt", "-e", "klingon"]).is_err());
	}

	#[test]
	fn global_flags_follow_subcommand() {
		let args = Args::try_parse_from(["scribe", "watch", "a.txt", "-v", "--config", "c.toml"]).unwrap();
		assert!(args.verbose);
		assert_eq!(args.config, Some(PathBuf::from("c.toml")));
	}

	#[test]
	fn log_filter_prefers_scribe_log_over_rust_log() {
		// SAFETY: no other test in this binary touches the environment.
		unsafe {
			std::env::remove_var("SCRIBE_LOG");
			std::env::set_var("RUST_LOG", "scribe_fs=debug");
		}
		assert_eq!(log_filter(false).to_string(), "scribe_fs=debug");

		unsafe {
			std::env::set_var("SCRIBE_LOG", "scribe_session=trace");
		}
		assert_eq!(log_filter(false).to_string(), "scribe_session=trace");

		unsafe {
			std::env::remove_var("SCRIBE_LOG");
			std::env::remove_var("RUST_LOG");
		}
		assert_eq!(log_filter(false).to_string(), "warn");
	}
}
