//! Error types for `ceremony`
//!
//! One enum per domain, aggregated into [`CeremonyError`] for the CLI.
//! None of these cross the sequencer's public API: data-shape problems are
//! absorbed into [`ShapeIssue`] warnings and degraded display content.

use std::path::PathBuf;
use thiserror::Error;

use crate::ceremony::phase::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `ceremony` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, bad duration)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Award data could not be loaded from any source
    pub const PROVIDER_ERROR: i32 = 4;

    /// Usage error (invalid arguments, strict validation failure)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `ceremony` operations.
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Award data could not be loaded
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Command-line usage error
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CeremonyError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Provider(_) => ExitCode::PROVIDER_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Provider Errors
// ============================================================================

/// Award data provider errors.
///
/// A provider failure triggers the bundled fallback; only a failure of the
/// bundled dataset itself reaches the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The payload could not be decoded into award records
    #[error("failed to decode award data from {source_name}: {message}")]
    Decode {
        /// Where the payload came from (URL, file path, "bundled")
        source_name: String,
        /// Decoder error message
        message: String,
    },

    /// I/O error reading an award data file
    #[error("award data I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source has no data for the requested season
    #[error("no award data for year {year}")]
    YearUnavailable {
        /// Requested season year
        year: u16,
    },

    /// The source is not usable at all
    #[error("award data unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

// ============================================================================
// Data Shape Issues
// ============================================================================

/// A recoverable problem with supplied award data.
///
/// Each issue is repaired locally (placeholder padding, skipping the combined
/// slide, re-inserting a winner) and reported as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeIssue {
    /// An award arrived with fewer than two non-winner finalists
    TooFewFinalists {
        /// Offending award
        award_id: String,
        /// Non-winner finalists actually supplied
        supplied: usize,
    },

    /// The playoff list does not open with the three championship records
    MissingChampionshipRecords {
        /// Ids found at the head of the playoff list
        found: Vec<String>,
    },

    /// A phase that normally carries awards has none and will be skipped
    EmptyPhase {
        /// The empty phase
        phase: Phase,
    },

    /// The winner was missing from the built finalist list and was re-added
    WinnerReinserted {
        /// Offending award
        award_id: String,
    },
}

impl std::fmt::Display for ShapeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFinalists { award_id, supplied } => write!(
                f,
                "award '{award_id}' supplied {supplied} finalist(s); padded with placeholders"
            ),
            Self::MissingChampionshipRecords { found } => write!(
                f,
                "playoff list does not start with the championship records (found {found:?}); combined slide disabled"
            ),
            Self::EmptyPhase { phase } => write!(f, "phase {phase} has no awards and will be skipped"),
            Self::WinnerReinserted { award_id } => {
                write!(f, "award '{award_id}' lost its winner while building finalists; re-inserted")
            }
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `ceremony` operations.
pub type Result<T> = std::result::Result<T, CeremonyError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::PROVIDER_ERROR, 4);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_provider_error_exit_code() {
        let err: CeremonyError = ProviderError::YearUnavailable { year: 1999 }.into();
        assert_eq!(err.exit_code(), ExitCode::PROVIDER_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: CeremonyError = ConfigError::MissingFile {
            path: PathBuf::from("/nope.yaml"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: CeremonyError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = CeremonyError::Usage("bad".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_shape_issue_display() {
        let issue = ShapeIssue::TooFewFinalists {
            award_id: "hart".to_string(),
            supplied: 1,
        };
        assert_eq!(
            issue.to_string(),
            "award 'hart' supplied 1 finalist(s); padded with placeholders"
        );
    }

    #[test]
    fn test_empty_phase_display() {
        let issue = ShapeIssue::EmptyPhase {
            phase: Phase::Suspense,
        };
        assert!(issue.to_string().contains("suspense"));
    }

    #[test]
    fn test_decode_error_display() {
        let err = ProviderError::Decode {
            source_name: "awards.json".to_string(),
            message: "expected a map".to_string(),
        };
        assert!(err.to_string().contains("awards.json"));
        assert!(err.to_string().contains("expected a map"));
    }
}
