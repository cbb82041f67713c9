//! Diagnostic logging
//!
//! `ceremony run` prints one snapshot JSON line per state change on stdout,
//! and downstream presenters parse that stream line by line. Every log line
//! therefore goes to stderr; nothing in this module may write to stdout.
//!
//! `-v` flags raise the level of the `ceremony` target only; the HTTP stack
//! behind the live data provider stays at `warn`. `CEREMONY_LOG_LEVEL`
//! replaces the whole directive when set.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding a full filter directive.
pub const LOG_LEVEL_ENV: &str = "CEREMONY_LOG_LEVEL";

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, colored when stderr is a terminal.
    #[default]
    Human,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Filter directive for a `-v` count.
///
/// Level 1 shows slide transitions, level 2 adds autoplay and lock
/// decisions, level 3 adds every timer firing.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,ceremony=info",
        2 => "warn,ceremony=debug",
        _ => "warn,ceremony=trace",
    }
}

/// Whether stderr log lines get ANSI colors.
///
/// `NO_COLOR` only affects `--color auto`; an explicit choice wins.
#[must_use]
pub const fn use_ansi(color: ColorChoice, stderr_is_terminal: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Auto => stderr_is_terminal && !no_color,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Installs the global subscriber on stderr.
///
/// Not called under `--quiet`. A second call is a no-op.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let show_target = verbosity >= 2;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_target(show_target)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder
            .with_ansi(use_ansi(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            ))
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
