//! Display snapshot
//!
//! A read-only, owned copy of everything a presentation layer needs to
//! draw the current slide. Snapshots are cheap to build and carry no
//! reference back into the sequencer.

use serde::Serialize;

use crate::data::Award;

use super::cursor::Slide;
use super::phase::Phase;
use super::session::RevealState;

/// Content of the current slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideContent {
    /// Intro or Closing: nothing award-specific
    None,
    /// One award
    Single {
        /// The award shown
        award: Award,
    },
    /// Combined championship slide
    Combined {
        /// Both conference championships
        conference_champions: [Award; 2],
        /// The league championship
        cup: Award,
    },
}

impl From<Slide<'_>> for SlideContent {
    fn from(slide: Slide<'_>) -> Self {
        match slide {
            Slide::Intro | Slide::Closing => Self::None,
            Slide::Award(award) => Self::Single {
                award: award.clone(),
            },
            Slide::Combined {
                conference_champions: [east, west],
                cup,
            } => Self::Combined {
                conference_champions: [east.clone(), west.clone()],
                cup: cup.clone(),
            },
        }
    }
}

impl SlideContent {
    /// The award shown, for single-award slides.
    #[must_use]
    pub const fn award(&self) -> Option<&Award> {
        match self {
            Self::Single { award } => Some(award),
            Self::None | Self::Combined { .. } => None,
        }
    }

    /// Short label for logs and events.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::None => "-",
            Self::Single { award } => &award.id,
            Self::Combined { .. } => "combined",
        }
    }
}

/// What is currently displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonySnapshot {
    /// Current phase
    pub phase: Phase,
    /// Index into the phase's effective slide list
    pub award_index: usize,
    /// Resolved slide content
    pub slide: SlideContent,
    /// Reveal progress
    pub reveal: RevealState,
    /// Autoplay switched on
    pub autoplay_enabled: bool,
    /// Autoplay suppressed by a recent manual interaction
    pub autoplay_paused: bool,
    /// A transition is settling
    pub transitioning: bool,
    /// No earlier slide exists
    pub is_first: bool,
    /// No later slide exists
    pub is_last: bool,
    /// Monotonic change counter
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::award;

    #[test]
    fn test_single_slide_json_shape() {
        let a = award("hart");
        let content = SlideContent::from(Slide::Award(&a));
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "single");
        assert_eq!(json["award"]["id"], "hart");
        assert_eq!(content.label(), "hart");
    }

    #[test]
    fn test_combined_slide_label() {
        let (e, w, c) = (award("east"), award("west"), award("cup"));
        let content = SlideContent::from(Slide::Combined {
            conference_champions: [&e, &w],
            cup: &c,
        });
        assert_eq!(content.label(), "combined");
        assert!(content.award().is_none());
    }

    #[test]
    fn test_intro_has_no_content() {
        assert_eq!(SlideContent::from(Slide::Intro), SlideContent::None);
    }
}
