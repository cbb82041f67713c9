//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and raw read (BOM tolerant)
//! 2. YAML parsing into [`CeremonyConfig`]
//! 3. `CEREMONY_<FIELD>` environment overrides for every timing field
//! 4. Validation (errors abort, warnings are returned)

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::schema::CeremonyConfig;
use crate::error::ConfigError;

/// Maximum configuration file size in bytes.
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Upper bound for any single timing value.
const MAX_TIMING: Duration = Duration::from_secs(24 * 60 * 60);

/// Prefix for timing overrides (`CEREMONY_FINALIST_DELAY=2s`).
const ENV_PREFIX: &str = "CEREMONY_";

/// Result of loading a configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration
    pub config: CeremonyConfig,
    /// Non-fatal findings
    pub warnings: Vec<String>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    env: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Creates a loader that reads overrides from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: std::env::vars()
                .filter(|(k, _)| k.starts_with(ENV_PREFIX))
                .collect(),
        }
    }

    /// Creates a loader with an explicit override set instead of the process
    /// environment.
    #[must_use]
    pub fn with_env(env: Vec<(String, String)>) -> Self {
        Self { env }
    }

    /// Loads `path`, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, too large, unparsable, carries
    /// a bad override, or fails validation.
    pub fn load(&self, path: Option<&Path>) -> Result<LoadResult, ConfigError> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => CeremonyConfig::default(),
        };
        self.finish(config)
    }

    /// Loads a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus file errors.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ConfigError> {
        let config = parse(yaml, Path::new("<inline>"))?;
        self.finish(config)
    }

    fn read(path: &Path) -> Result<CeremonyConfig, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{} bytes", metadata.len()),
                expected: format!("at most {MAX_CONFIG_SIZE} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        parse(raw, path)
    }

    fn finish(&self, mut config: CeremonyConfig) -> Result<LoadResult, ConfigError> {
        self.apply_overrides(&mut config)?;
        let warnings = validate(&config)?;
        Ok(LoadResult { config, warnings })
    }

    fn apply_overrides(&self, config: &mut CeremonyConfig) -> Result<(), ConfigError> {
        for (name, slot) in config.timing.fields_mut() {
            let key = format!("{ENV_PREFIX}{}", name.to_ascii_uppercase());
            let Some((_, raw)) = self.env.iter().find(|(k, _)| *k == key) else {
                continue;
            };
            *slot = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                field: key.clone(),
                value: raw.clone(),
                expected: format!("a duration such as '2500ms' ({e})"),
            })?;
            debug!(field = name, value = %raw, "timing override from environment");
        }
        Ok(())
    }
}

fn parse(yaml: &str, path: &Path) -> Result<CeremonyConfig, ConfigError> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })?;
    if value.is_null() {
        return Ok(CeremonyConfig::default());
    }
    serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: None,
        message: format!("failed to deserialize configuration: {e}"),
    })
}

/// Validates a configuration, returning warnings on success.
fn validate(config: &CeremonyConfig) -> Result<Vec<String>, ConfigError> {
    let timing = &config.timing;
    let mut warnings = Vec::new();

    let mut bounded = timing.clone();
    for (name, value) in bounded.fields_mut() {
        if *value > MAX_TIMING {
            return Err(ConfigError::InvalidValue {
                field: format!("timing.{name}"),
                value: humantime::format_duration(*value).to_string(),
                expected: format!("at most {}", humantime::format_duration(MAX_TIMING)),
            });
        }
    }

    if timing.finalist_delay.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: "timing.finalist_delay".to_string(),
            value: "0s".to_string(),
            expected: "a non-zero duration".to_string(),
        });
    }

    let ids = &config.combined_slide.award_ids;
    if ids[0] == ids[1] || ids[1] == ids[2] || ids[0] == ids[2] {
        return Err(ConfigError::InvalidValue {
            field: "combined_slide.award_ids".to_string(),
            value: format!("{ids:?}"),
            expected: "three distinct award ids".to_string(),
        });
    }

    let shortest_auto = [
        ("intro_duration", timing.intro_duration),
        ("slide_duration", timing.slide_duration),
        ("winner_view_duration", timing.winner_view_duration),
    ];
    for (name, value) in shortest_auto {
        if value < timing.settle_delay {
            warnings.push(format!(
                "timing.{name} ({}) is shorter than settle_delay ({}); auto-advance will wait for the lock",
                humantime::format_duration(value),
                humantime::format_duration(timing.settle_delay)
            ));
        }
    }

    if timing.manual_override_cooldown.is_zero() {
        warnings.push("timing.manual_override_cooldown is 0s; manual navigation never pauses autoplay for long".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let result = ConfigLoader::with_env(vec![]).load(None).unwrap();
        assert_eq!(result.config, CeremonyConfig::default());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_file_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}timing:\n  slide_duration: 4s\n").unwrap();
        let result = ConfigLoader::with_env(vec![]).load(Some(file.path())).unwrap();
        assert_eq!(result.config.timing.slide_duration, Duration::from_secs(4));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::with_env(vec![])
            .load(Some(Path::new("/no/such/ceremony.yaml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_empty_file_is_default() {
        let result = ConfigLoader::with_env(vec![]).load_from_str("").unwrap();
        assert_eq!(result.config, CeremonyConfig::default());
    }

    #[test]
    fn test_env_override() {
        let loader = ConfigLoader::with_env(vec![(
            "CEREMONY_FINALIST_DELAY".to_string(),
            "400ms".to_string(),
        )]);
        let result = loader.load_from_str("timing:\n  finalist_delay: 2s\n").unwrap();
        assert_eq!(result.config.timing.finalist_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_bad_env_override() {
        let loader = ConfigLoader::with_env(vec![(
            "CEREMONY_SETTLE_DELAY".to_string(),
            "whenever".to_string(),
        )]);
        let err = loader.load(None).unwrap_err();
        assert!(err.to_string().contains("CEREMONY_SETTLE_DELAY"));
    }

    #[test]
    fn test_zero_finalist_delay_rejected() {
        let err = ConfigLoader::with_env(vec![])
            .load_from_str("timing:\n  finalist_delay: 0s\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_oversized_timing_rejected() {
        let err = ConfigLoader::with_env(vec![])
            .load_from_str("timing:\n  winner_view_duration: 100000h\n")
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => {
                assert_eq!(field, "timing.winner_view_duration");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_env_override_rejected() {
        let loader = ConfigLoader::with_env(vec![(
            "CEREMONY_SLIDE_DURATION".to_string(),
            "25h".to_string(),
        )]);
        let err = loader.load(None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("timing.slide_duration"));
    }

    #[test]
    fn test_full_day_timing_accepted() {
        let result = ConfigLoader::with_env(vec![])
            .load_from_str("timing:\n  intro_duration: 24h\n")
            .unwrap();
        assert_eq!(result.config.timing.intro_duration, MAX_TIMING);
    }

    #[test]
    fn test_duplicate_combined_ids_rejected() {
        let yaml = "combined_slide:\n  award_ids: [a, a, b]\n";
        let err = ConfigLoader::with_env(vec![]).load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("combined_slide.award_ids"));
    }

    #[test]
    fn test_short_slide_warns() {
        let yaml = "timing:\n  slide_duration: 500ms\n  settle_delay: 1s\n";
        let result = ConfigLoader::with_env(vec![]).load_from_str(yaml).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("slide_duration"));
    }

    #[test]
    fn test_parse_error_has_line() {
        let err = ConfigLoader::with_env(vec![])
            .load_from_str("timing: [unclosed\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
