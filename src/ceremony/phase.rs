//! Phase table
//!
//! The fixed phase order of a ceremony and the per-phase award lists and
//! behavior profiles the sequencer iterates.

use serde::{Deserialize, Serialize};

use crate::config::Timing;
use crate::data::{Award, AwardDataSet};
use crate::error::ShapeIssue;

/// One of the five ordered ceremony stages.
///
/// The derived `Ord` follows declaration order, which is the ceremony order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening slide, no awards
    Intro,
    /// Regular-season awards, all shown at once
    RegularSeason,
    /// Playoff awards, opening with the combined championship slide
    Playoffs,
    /// Headline awards revealed finalist by finalist
    Suspense,
    /// Closing slide, terminal
    Closing,
}

impl Phase {
    /// All phases in ceremony order.
    pub const ALL: [Self; 5] = [
        Self::Intro,
        Self::RegularSeason,
        Self::Playoffs,
        Self::Suspense,
        Self::Closing,
    ];

    /// Returns the following phase, or `None` from `Closing`.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Intro => Some(Self::RegularSeason),
            Self::RegularSeason => Some(Self::Playoffs),
            Self::Playoffs => Some(Self::Suspense),
            Self::Suspense => Some(Self::Closing),
            Self::Closing => None,
        }
    }

    /// Returns the preceding phase, or `None` from `Intro`.
    #[must_use]
    pub const fn predecessor(self) -> Option<Self> {
        match self {
            Self::Intro => None,
            Self::RegularSeason => Some(Self::Intro),
            Self::Playoffs => Some(Self::RegularSeason),
            Self::Suspense => Some(Self::Playoffs),
            Self::Closing => Some(Self::Suspense),
        }
    }

    /// Whether this phase iterates an award list.
    #[must_use]
    pub const fn has_awards(self) -> bool {
        matches!(self, Self::RegularSeason | Self::Playoffs | Self::Suspense)
    }

    /// Stable lowercase name used in logs, events, and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::RegularSeason => "regular_season",
            Self::Playoffs => "playoffs",
            Self::Suspense => "suspense",
            Self::Closing => "closing",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a slide's finalists and winner are disclosed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStyle {
    /// No award content (Intro, Closing)
    None,
    /// Everything visible on entry
    Immediate,
    /// Heading, then finalists one by one, then the winner
    Staggered,
}

/// Behavior profile for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseProfile {
    /// How award content is revealed
    pub reveal: RevealStyle,
    /// Autoplay dwell time for `Immediate` and award-less slides; `None`
    /// means the phase never auto-advances on its own
    pub dwell: Option<std::time::Duration>,
}

impl PhaseProfile {
    /// Resolves the profile of `phase` under `timing`.
    #[must_use]
    pub const fn for_phase(phase: Phase, timing: &Timing) -> Self {
        match phase {
            Phase::Intro => Self {
                reveal: RevealStyle::None,
                dwell: Some(timing.intro_duration),
            },
            Phase::RegularSeason | Phase::Playoffs => Self {
                reveal: RevealStyle::Immediate,
                dwell: Some(timing.slide_duration),
            },
            Phase::Suspense => Self {
                reveal: RevealStyle::Staggered,
                dwell: None,
            },
            Phase::Closing => Self {
                reveal: RevealStyle::None,
                dwell: None,
            },
        }
    }
}

/// Static, immutable phase → award-list definition.
///
/// Built once from the loaded [`AwardDataSet`]; the sequencer never mutates it.
#[derive(Debug, Clone)]
pub struct PhaseTable {
    regular_season: Vec<Award>,
    playoffs: Vec<Award>,
    suspense: Vec<Award>,
    combined_slide: bool,
}

impl PhaseTable {
    /// Builds the table, detecting whether the playoff list supports the
    /// combined championship slide.
    ///
    /// `combined_ids` are the three award ids, in order, that the combined
    /// slide folds together. Returns the table plus any shape issues found.
    #[must_use]
    pub fn new(data: AwardDataSet, combined_ids: &[String; 3]) -> (Self, Vec<ShapeIssue>) {
        let mut issues = Vec::new();

        let combined_slide = data.playoff_awards.len() >= 3
            && data
                .playoff_awards
                .iter()
                .zip(combined_ids.iter())
                .all(|(award, id)| award.id == *id);

        if !combined_slide && !data.playoff_awards.is_empty() {
            issues.push(ShapeIssue::MissingChampionshipRecords {
                found: data
                    .playoff_awards
                    .iter()
                    .take(3)
                    .map(|a| a.id.clone())
                    .collect(),
            });
        }

        let table = Self {
            regular_season: data.regular_season_awards,
            playoffs: data.playoff_awards,
            suspense: data.suspense_awards,
            combined_slide,
        };

        for phase in Phase::ALL {
            if phase.has_awards() && table.awards(phase).is_empty() {
                issues.push(ShapeIssue::EmptyPhase { phase });
            }
        }

        (table, issues)
    }

    /// Returns the underlying (unfolded) award list of a phase.
    #[must_use]
    pub fn awards(&self, phase: Phase) -> &[Award] {
        match phase {
            Phase::RegularSeason => &self.regular_season,
            Phase::Playoffs => &self.playoffs,
            Phase::Suspense => &self.suspense,
            Phase::Intro | Phase::Closing => &[],
        }
    }

    /// Whether Playoffs index 0 is the combined championship slide.
    #[must_use]
    pub const fn has_combined_slide(&self) -> bool {
        self.combined_slide
    }

    /// Total number of awards across all phases.
    #[must_use]
    pub fn award_count(&self) -> usize {
        self.regular_season.len() + self.playoffs.len() + self.suspense.len()
    }
}
