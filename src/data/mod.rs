//! Award data
//!
//! Record types, normalization into [`AwardDataSet`], and the providers
//! that fetch a season's awards (bundled, file, live HTTP) with the
//! fall-back-to-bundled policy.

pub mod award;
pub mod provider;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ShapeIssue;

pub use award::{Award, AwardKind, AwardRecord, Nominee};
pub use provider::{
    AwardDataProvider, BundledProvider, DataMode, DataSource, FileProvider, LiveProvider,
    LoadOptions, LoadOutcome, load_award_data, load_with_fallback, primary_provider,
};

/// One season of raw award records, as serialized by every provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecords {
    /// Season year; a file without one is accepted for any requested year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Regular-season awards, in presentation order
    #[serde(default, alias = "regularSeasonAwards")]
    pub regular_season_awards: Vec<AwardRecord>,
    /// Playoff awards, championship records first
    #[serde(default, alias = "playoffAwards")]
    pub playoff_awards: Vec<AwardRecord>,
    /// Suspense awards, in presentation order
    #[serde(default, alias = "suspenseAwards")]
    pub suspense_awards: Vec<AwardRecord>,
}

impl SeasonRecords {
    /// Normalizes every record, building finalist lists.
    ///
    /// Returns the immutable data set plus the shape issues repaired.
    pub fn normalize<R: Rng + ?Sized>(self, rng: &mut R) -> (AwardDataSet, Vec<ShapeIssue>) {
        let mut issues = Vec::new();
        let mut build = |records: Vec<AwardRecord>| -> Vec<Award> {
            records
                .into_iter()
                .map(|record| {
                    let (award, found) = Award::from_record(record, rng);
                    issues.extend(found);
                    award
                })
                .collect()
        };

        let data = AwardDataSet {
            regular_season_awards: build(self.regular_season_awards),
            playoff_awards: build(self.playoff_awards),
            suspense_awards: build(self.suspense_awards),
        };
        (data, issues)
    }
}

/// Normalized, immutable phase → award-list data supplied once at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AwardDataSet {
    /// Regular-season awards
    pub regular_season_awards: Vec<Award>,
    /// Playoff awards
    pub playoff_awards: Vec<Award>,
    /// Suspense awards
    pub suspense_awards: Vec<Award>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_normalize_collects_issues() {
        let yaml = r"
year: 2024
suspense_awards:
  - id: hart
    name: Hart Memorial Trophy
    kind: individual
    winner: { name: Nathan MacKinnon, team_code: COL }
    finalists:
      - { name: Nikita Kucherov, team_code: TBL }
";
        let records: SeasonRecords = serde_yaml::from_str(yaml).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let (data, issues) = records.normalize(&mut rng);

        assert_eq!(data.suspense_awards.len(), 1);
        assert_eq!(data.suspense_awards[0].finalists().len(), 3);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_camel_case_aliases() {
        let json = r#"{"regularSeasonAwards": [], "playoffAwards": [], "suspenseAwards": []}"#;
        let records: SeasonRecords = serde_json::from_str(json).unwrap();
        assert!(records.year.is_none());
        assert!(records.suspense_awards.is_empty());
    }
}
