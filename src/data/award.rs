//! Award and nominee types
//!
//! Raw records as a provider supplies them, and the normalized, immutable
//! [`Award`] the engine works with.

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ceremony::finalists::{self, MIN_RIVALS};
use crate::error::ShapeIssue;

/// Whether an award goes to a team or to a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    /// Team trophy (Presidents' Trophy, Stanley Cup)
    Team,
    /// Individual trophy (Hart, Vezina)
    Individual,
}

/// A winner or finalist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nominee {
    /// Display name
    pub name: String,
    /// Team abbreviation, if known
    #[serde(default, alias = "teamCode", skip_serializing_if = "Option::is_none")]
    pub team_code: Option<String>,
    /// Opaque display statistics, in source order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub stats: IndexMap<String, serde_json::Value>,
}

impl Nominee {
    /// Whether two entries denote the same nominee.
    ///
    /// Compares trimmed names case-insensitively; sources disagree on
    /// capitalization and team codes are often missing on one side.
    #[must_use]
    pub fn is_same_nominee(&self, other: &Self) -> bool {
        self.name.trim().eq_ignore_ascii_case(other.name.trim())
    }
}

/// An award exactly as a provider delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    /// Unique identifier (e.g. `"stanley-cup"`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    #[serde(default)]
    pub description: String,
    /// Team or individual award
    pub kind: AwardKind,
    /// The winner
    pub winner: Nominee,
    /// Finalists; may omit or duplicate the winner
    #[serde(default)]
    pub finalists: Vec<Nominee>,
}

/// A normalized award.
///
/// Constructed only through [`Award::from_record`], which guarantees the
/// winner appears in `finalists` and that there are at least three entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Award {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Team or individual award
    pub kind: AwardKind,
    winner: Nominee,
    finalists: Vec<Nominee>,
}

impl Award {
    /// Normalizes a raw record, building its display finalist list.
    ///
    /// Returns the award and any shape issues repaired along the way.
    pub fn from_record<R: Rng + ?Sized>(record: AwardRecord, rng: &mut R) -> (Self, Vec<ShapeIssue>) {
        let mut issues = Vec::new();

        let supplied = finalists::rival_count(&record.winner, &record.finalists);
        if supplied < MIN_RIVALS {
            issues.push(ShapeIssue::TooFewFinalists {
                award_id: record.id.clone(),
                supplied,
            });
        }

        let mut built = finalists::build_finalists(&record.winner, &record.finalists, rng);
        let healed = finalists::heal_missing_winner(&record.winner, &mut built);
        debug_assert!(!healed, "winner missing from built finalists of '{}'", record.id);
        if healed {
            warn!(award_id = %record.id, "winner missing after building finalists; re-inserted");
            issues.push(ShapeIssue::WinnerReinserted {
                award_id: record.id.clone(),
            });
        }

        let award = Self {
            id: record.id,
            name: record.name,
            description: record.description,
            kind: record.kind,
            winner: record.winner,
            finalists: built,
        };
        (award, issues)
    }

    /// The winner.
    #[must_use]
    pub const fn winner(&self) -> &Nominee {
        &self.winner
    }

    /// Finalists in display order, winner included.
    #[must_use]
    pub fn finalists(&self) -> &[Nominee] {
        &self.finalists
    }

    /// Index of the winner within [`finalists`](Self::finalists).
    #[must_use]
    pub fn winner_index(&self) -> Option<usize> {
        self.finalists.iter().position(|n| n.is_same_nominee(&self.winner))
    }
}
