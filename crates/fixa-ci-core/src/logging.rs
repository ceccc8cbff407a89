//! Process-level logging initialization for the fixa-ci binary.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Environment variable holding the log level
pub const ENV_LOG: &str = "FIXA_LOG";

static INIT: OnceLock<()> = OnceLock::new();

fn parse_level(value: Option<&str>) -> Level {
    match value.unwrap_or("info").trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// One formatter serves both streams, so colour needs both to be terminals
fn use_ansi(stdout_is_terminal: bool, stderr_is_terminal: bool) -> bool {
    stdout_is_terminal && stderr_is_terminal
}

/// UTC RFC 3339 timestamps with millisecond precision
struct UtcMillis;

impl FormatTime for UtcMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Initialize tracing output from `FIXA_LOG`, or at debug level when
/// `verbose` is set.
///
/// Warnings and errors go to stderr, everything else to stdout. Safe to call
/// more than once; only the first call installs the subscriber.
pub fn init(verbose: bool) {
    if INIT.get().is_some() {
        return;
    }
    let level = if verbose {
        Level::DEBUG
    } else {
        parse_level(std::env::var(ENV_LOG).ok().as_deref())
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_timer(UtcMillis)
        .with_ansi(use_ansi(
            std::io::stdout().is_terminal(),
            std::io::stderr().is_terminal(),
        ))
        .with_writer(writer)
        .try_init();
    let _ = INIT.set(());
}
