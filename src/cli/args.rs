//! CLI argument definitions
//!
//! All Clap derive structs for `ceremony` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::data::DataMode;

// ============================================================================
// Root CLI
// ============================================================================

/// Timed reveal-and-reward sequencing for awards ceremonies.
#[derive(Parser, Debug)]
#[command(name = "ceremony", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CEREMONY_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "CEREMONY_LOG_FORMAT")]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a ceremony, reading presenter commands from stdin.
    Run(RunArgs),

    /// Check award data files without running a ceremony.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Award data source.
    #[arg(long, default_value = "mock", env = "CEREMONY_MODE")]
    pub mode: DataMode,

    /// Season to present.
    #[arg(long, default_value_t = 2024, env = "CEREMONY_YEAR")]
    pub year: u16,

    /// Award data file (YAML or JSON); replaces the bundled dataset in mock mode.
    #[arg(long, env = "CEREMONY_DATA")]
    pub data: Option<PathBuf>,

    /// Base URL of the live award service.
    #[arg(long, env = "CEREMONY_LIVE_URL")]
    pub live_url: Option<String>,

    /// Timing configuration file.
    #[arg(short, long, env = "CEREMONY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Start with autoplay switched off.
    #[arg(long)]
    pub no_autoplay: bool,

    /// Where to write the JSONL event stream: `stdout`, `stderr`, or a file path.
    #[arg(long, env = "CEREMONY_EVENTS")]
    pub events: Option<String>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, env = "CEREMONY_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Exit once the Closing slide is reached.
    #[arg(long)]
    pub exit_on_close: bool,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Award data files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat shape issues as failures.
    #[arg(long)]
    pub strict: bool,

    /// Timing configuration whose combined-slide ids are checked against.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["ceremony", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = run_args(&[]);
        assert_eq!(args.mode, DataMode::Mock);
        assert_eq!(args.year, 2024);
        assert!(!args.no_autoplay);
        assert!(!args.exit_on_close);
        assert!(args.events.is_none());
    }

    #[test]
    fn test_run_live_mode() {
        let args = run_args(&["--mode", "live", "--live-url", "http://awards.test", "--year", "2023"]);
        assert_eq!(args.mode, DataMode::Live);
        assert_eq!(args.year, 2023);
        assert_eq!(args.live_url.as_deref(), Some("http://awards.test"));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["ceremony", "run", "--mode", "replay"]).is_err());
    }

    #[test]
    fn test_validate_requires_files() {
        assert!(Cli::try_parse_from(["ceremony", "validate"]).is_err());
        assert!(Cli::try_parse_from(["ceremony", "validate", "a.yaml", "--strict"]).is_ok());
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["ceremony", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["ceremony", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ceremony", "run", "-vv", "--color", "never"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn test_shells_parse() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            assert!(Cli::try_parse_from(["ceremony", "completions", shell]).is_ok());
        }
    }
}
