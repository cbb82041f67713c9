//! Award data providers
//!
//! Every provider yields one season of [`SeasonRecords`]. The
//! [`load_award_data`] entry point picks a source with [`primary_provider`]
//! and hands it to [`load_with_fallback`], which falls back to the dataset
//! compiled into the binary when that source fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ShapeIssue};

use super::{AwardDataSet, SeasonRecords};

const BUNDLED_AWARDS: &str = include_str!("bundled_awards.yaml");

/// Where award data is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DataMode {
    /// Static dataset compiled into the binary (or `--data` file)
    #[default]
    Mock,
    /// Live HTTP source
    Live,
}

impl DataMode {
    /// Lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Live => "live",
        }
    }
}

/// Which source actually produced the loaded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The compiled-in dataset
    Bundled {
        /// Season actually served (may precede the requested one)
        year: u16,
    },
    /// A local file
    File(PathBuf),
    /// The live HTTP source
    Live(String),
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bundled { year } => write!(f, "bundled:{year}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Live(url) => write!(f, "live:{url}"),
        }
    }
}

/// A source of season award records.
#[async_trait]
pub trait AwardDataProvider: Send + Sync {
    /// Fetches the raw records for `year`.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` when the source is unreachable, has no data
    /// for `year`, or returns an undecodable payload.
    async fn load(&self, year: u16) -> Result<(SeasonRecords, DataSource), ProviderError>;
}

// ============================================================================
// Bundled
// ============================================================================

#[derive(Debug, Deserialize)]
struct BundledSeasons {
    seasons: Vec<SeasonRecords>,
}

/// Serves the static dataset compiled into the binary.
///
/// When the exact year is missing, the nearest earlier season is served; if
/// none precedes it, the earliest season is.
#[derive(Debug, Default)]
pub struct BundledProvider;

impl BundledProvider {
    /// Years present in the bundled dataset, ascending.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Decode` if the bundled YAML is malformed.
    pub fn years() -> Result<Vec<u16>, ProviderError> {
        let mut years: Vec<u16> = Self::seasons()?.iter().filter_map(|s| s.year).collect();
        years.sort_unstable();
        Ok(years)
    }

    fn seasons() -> Result<Vec<SeasonRecords>, ProviderError> {
        serde_yaml::from_str::<BundledSeasons>(BUNDLED_AWARDS)
            .map(|b| b.seasons)
            .map_err(|e| ProviderError::Decode {
                source_name: "bundled".to_string(),
                message: e.to_string(),
            })
    }

    fn select(year: u16) -> Result<SeasonRecords, ProviderError> {
        let mut seasons = Self::seasons()?;
        seasons.sort_by_key(|s| s.year.unwrap_or(0));

        let index = seasons
            .iter()
            .rposition(|s| s.year.is_some_and(|y| y <= year))
            .or_else(|| (!seasons.is_empty()).then_some(0))
            .ok_or(ProviderError::YearUnavailable { year })?;
        Ok(seasons.swap_remove(index))
    }
}

#[async_trait]
impl AwardDataProvider for BundledProvider {
    async fn load(&self, year: u16) -> Result<(SeasonRecords, DataSource), ProviderError> {
        let season = Self::select(year)?;
        let served = season.year.unwrap_or(year);
        if served != year {
            debug!(requested = year, served, "bundled dataset has no exact season match");
        }
        Ok((season, DataSource::Bundled { year: served }))
    }
}

// ============================================================================
// File
// ============================================================================

/// Reads one season from a YAML or JSON file (chosen by extension).
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    /// Creates a provider for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads and decodes the file without checking its year.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Io` or `ProviderError::Decode`.
    pub fn read(path: &Path) -> Result<SeasonRecords, ProviderError> {
        let raw = std::fs::read_to_string(path)?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let decoded = if is_json {
            serde_json::from_str(raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(raw).map_err(|e| e.to_string())
        };
        decoded.map_err(|message| ProviderError::Decode {
            source_name: path.display().to_string(),
            message,
        })
    }
}

#[async_trait]
impl AwardDataProvider for FileProvider {
    async fn load(&self, year: u16) -> Result<(SeasonRecords, DataSource), ProviderError> {
        let season = Self::read(&self.path)?;
        if season.year.is_some_and(|y| y != year) {
            return Err(ProviderError::YearUnavailable { year });
        }
        Ok((season, DataSource::File(self.path.clone())))
    }
}

// ============================================================================
// Live
// ============================================================================

/// Fetches `{base_url}/{year}/awards.json` over HTTP.
#[derive(Debug, Clone)]
pub struct LiveProvider {
    base_url: String,
    client: reqwest::Client,
}

impl LiveProvider {
    /// Creates a provider rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, year: u16) -> String {
        format!("{}/{year}/awards.json", self.base_url)
    }
}

#[async_trait]
impl AwardDataProvider for LiveProvider {
    async fn load(&self, year: u16) -> Result<(SeasonRecords, DataSource), ProviderError> {
        let url = self.url_for(year);
        debug!(%url, "fetching live award data");

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::YearUnavailable { year });
        }
        let response = response.error_for_status()?;
        let season: SeasonRecords = response.json().await.map_err(|e| ProviderError::Decode {
            source_name: url.clone(),
            message: e.to_string(),
        })?;
        Ok((season, DataSource::Live(url)))
    }
}

// ============================================================================
// Loading with fallback
// ============================================================================

/// Options for [`load_award_data`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File to serve in `Mock` mode instead of the bundled dataset
    pub data_file: Option<PathBuf>,
    /// Base URL of the live source
    pub live_url: String,
    /// Live request timeout
    pub live_timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_file: None,
            live_url: "http://127.0.0.1:8080/awards".to_string(),
            live_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a successful load.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Normalized award data
    pub data: AwardDataSet,
    /// Source that produced it
    pub source: DataSource,
    /// Why the requested source was abandoned, when the bundled data was used instead
    pub fallback_reason: Option<String>,
    /// Shape issues repaired while normalizing
    pub issues: Vec<ShapeIssue>,
}

/// Loads and normalizes one season of award data.
///
/// Any failure of the requested source falls back to [`BundledProvider`].
///
/// # Errors
///
/// Returns a `ProviderError` only if the bundled dataset also fails.
pub async fn load_award_data<R: Rng + ?Sized>(
    mode: DataMode,
    year: u16,
    options: &LoadOptions,
    rng: &mut R,
) -> Result<LoadOutcome, ProviderError> {
    let primary = primary_provider(mode, options);
    load_with_fallback(primary.as_deref(), year, rng).await
}

/// The source `mode` asks for, or `None` when the bundled dataset is it.
///
/// A live provider that cannot be constructed is logged and skipped.
#[must_use]
pub fn primary_provider(mode: DataMode, options: &LoadOptions) -> Option<Box<dyn AwardDataProvider>> {
    match (mode, &options.data_file) {
        (DataMode::Mock, None) => None,
        (DataMode::Mock, Some(path)) => Some(Box::new(FileProvider::new(path.clone()))),
        (DataMode::Live, _) => match LiveProvider::new(&options.live_url, options.live_timeout) {
            Ok(p) => Some(Box::new(p)),
            Err(e) => {
                warn!(error = %e, "live provider unavailable");
                None
            }
        },
    }
}

/// Tries `primary`, then the bundled dataset.
///
/// The primary's error text ends up in [`LoadOutcome::fallback_reason`].
///
/// # Errors
///
/// Returns a `ProviderError` only if the bundled dataset also fails.
pub async fn load_with_fallback<R: Rng + ?Sized>(
    primary: Option<&dyn AwardDataProvider>,
    year: u16,
    rng: &mut R,
) -> Result<LoadOutcome, ProviderError> {
    let mut fallback_reason = None;
    if let Some(provider) = primary {
        match provider.load(year).await {
            Ok((records, source)) => {
                info!(%source, year, "award data loaded");
                return Ok(finish(records, source, None, rng));
            }
            Err(e) => {
                warn!(error = %e, "award data source failed; using bundled dataset");
                fallback_reason = Some(e.to_string());
            }
        }
    }

    let (records, source) = BundledProvider.load(year).await?;
    info!(%source, year, "award data loaded");
    Ok(finish(records, source, fallback_reason, rng))
}

fn finish<R: Rng + ?Sized>(
    records: SeasonRecords,
    source: DataSource,
    fallback_reason: Option<String>,
    rng: &mut R,
) -> LoadOutcome {
    let (data, issues) = records.normalize(rng);
    for issue in &issues {
        warn!(%issue, "award data shape issue");
    }
    LoadOutcome {
        data,
        source,
        fallback_reason,
        issues,
    }
}
