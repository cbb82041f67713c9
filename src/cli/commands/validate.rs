//! Award data validation
//!
//! Loads each file, normalizes it the way `run` would, and reports the
//! shape issues that normalization repaired.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::ceremony::PhaseTable;
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{CombinedSlideConfig, ConfigLoader};
use crate::data::FileProvider;
use crate::error::{CeremonyError, ShapeIssue};

/// Validation result for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File checked
    pub file: String,
    /// Season declared in the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Awards across all phases
    pub award_count: usize,
    /// Whether the combined championship slide is available
    pub combined_slide: bool,
    /// Repaired shape issues
    pub issues: Vec<String>,
}

/// Validate award data files.
///
/// # Errors
///
/// Returns an I/O error for a missing file, a provider error for an
/// undecodable one, and a usage error under `--strict` when any issue is
/// found.
pub fn run(args: &ValidateArgs) -> Result<(), CeremonyError> {
    let combined = match &args.config {
        Some(path) => ConfigLoader::new().load(Some(path))?.config.combined_slide,
        None => CombinedSlideConfig::default(),
    };

    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        if !path.exists() {
            return Err(CeremonyError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }
        tracing::info!(file = %path.display(), "validating award data");
        reports.push(check_file(path, &combined)?);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let total: usize = reports.iter().map(|r| r.issues.len()).sum();
    if args.strict && total > 0 {
        return Err(CeremonyError::Usage(format!(
            "{total} award data issue(s) found"
        )));
    }
    Ok(())
}

/// Checks one file.
///
/// # Errors
///
/// Returns a provider error if the file cannot be read or decoded.
pub fn check_file(path: &Path, combined: &CombinedSlideConfig) -> Result<FileReport, CeremonyError> {
    let records = FileProvider::read(path)?;
    let year = records.year;

    // Finalist order is shuffled during normalization; the issues found do
    // not depend on the order.
    let mut rng = StdRng::seed_from_u64(0);
    let (data, mut issues) = records.normalize(&mut rng);
    let (table, table_issues) = PhaseTable::new(data, &combined.award_ids);
    issues.extend(table_issues);

    for issue in &issues {
        tracing::warn!(file = %path.display(), %issue, "award data shape issue");
    }

    Ok(FileReport {
        file: path.display().to_string(),
        year,
        award_count: table.award_count(),
        combined_slide: table.has_combined_slide(),
        issues: issues.iter().map(ShapeIssue::to_string).collect(),
    })
}

fn print_human(report: &FileReport) {
    let status = if report.issues.is_empty() { "ok" } else { "warn" };
    let year = report
        .year
        .map_or_else(|| "any year".to_string(), |y| y.to_string());
    println!(
        "{status:<5} {} ({year}, {} awards)",
        report.file, report.award_count
    );
    for issue in &report.issues {
        println!("      - {issue}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const CLEAN: &str = r"
year: 2024
regular_season_awards:
  - id: art-ross
    name: Art Ross Trophy
    kind: individual
    winner: { name: Nikita Kucherov }
    finalists:
      - { name: Nathan MacKinnon }
      - { name: Connor McDavid }
playoff_awards:
  - id: prince-of-wales
    name: Prince of Wales Trophy
    kind: team
    winner: { name: Florida Panthers }
    finalists:
      - { name: New York Rangers }
      - { name: Boston Bruins }
  - id: campbell-bowl
    name: Clarence S. Campbell Bowl
    kind: team
    winner: { name: Edmonton Oilers }
    finalists:
      - { name: Dallas Stars }
      - { name: Vancouver Canucks }
  - id: stanley-cup
    name: Stanley Cup
    kind: team
    winner: { name: Florida Panthers }
    finalists:
      - { name: Edmonton Oilers }
      - { name: Dallas Stars }
suspense_awards:
  - id: hart
    name: Hart Memorial Trophy
    kind: individual
    winner: { name: Nathan MacKinnon }
    finalists:
      - { name: Nikita Kucherov }
      - { name: Connor McDavid }
";

    fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn args(files: Vec<PathBuf>, strict: bool) -> ValidateArgs {
        ValidateArgs {
            files,
            format: OutputFormat::Json,
            strict,
            config: None,
        }
    }

    #[test]
    fn test_clean_file_has_no_issues() {
        let file = write_temp(CLEAN, ".yaml");
        let report = check_file(file.path(), &CombinedSlideConfig::default()).unwrap();
        assert_eq!(report.year, Some(2024));
        assert_eq!(report.award_count, 5);
        assert!(report.combined_slide);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn test_short_finalist_list_reported() {
        let file = write_temp(
            &CLEAN.replace("      - { name: Connor McDavid }\nplayoff_awards", "playoff_awards"),
            ".yaml",
        );
        let report = check_file(file.path(), &CombinedSlideConfig::default()).unwrap();
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains("art-ross"));
    }

    #[test]
    fn test_strict_fails_on_issues() {
        let file = write_temp("year: 2024\nregular_season_awards: []\n", ".yaml");
        assert!(run(&args(vec![file.path().to_path_buf()], false)).is_ok());

        let err = run(&args(vec![file.path().to_path_buf()], true)).unwrap_err();
        assert!(matches!(err, CeremonyError::Usage(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = run(&args(vec![PathBuf::from("/nonexistent/awards.yaml")], false)).unwrap_err();
        assert!(matches!(err, CeremonyError::Io(_)));
    }

    #[test]
    fn test_undecodable_file_is_provider_error() {
        let file = write_temp("{not json", ".json");
        let err = run(&args(vec![file.path().to_path_buf()], false)).unwrap_err();
        assert!(matches!(err, CeremonyError::Provider(_)));
    }
}
