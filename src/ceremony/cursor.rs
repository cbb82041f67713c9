//! Award cursor
//!
//! Pure mapping from a `(phase, index)` position to the slide it displays,
//! and the forward/backward step functions over those positions.
//!
//! Playoffs fold their first three underlying awards (both conference
//! championships and the cup) into one combined slide at index 0, so index
//! `i >= 1` maps to `underlying[i + 2]`. When the playoff list does not open
//! with those three records, Playoffs iterate one award per slide like every
//! other phase.

use serde::Serialize;

use crate::data::Award;

use super::phase::{Phase, PhaseTable};

/// Awards folded into the combined championship slide.
pub const COMBINED_AWARDS: usize = 3;

/// A cursor position: a phase and an index into its effective slide list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Current phase
    pub phase: Phase,
    /// Index into the phase's effective slide list
    pub index: usize,
}

impl Position {
    /// The first position of every ceremony.
    pub const START: Self = Self {
        phase: Phase::Intro,
        index: 0,
    };

    /// Creates a position.
    #[must_use]
    pub const fn new(phase: Phase, index: usize) -> Self {
        Self { phase, index }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.phase, self.index)
    }
}

/// What a position displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slide<'a> {
    /// Opening slide
    Intro,
    /// A single award
    Award(&'a Award),
    /// Both conference champions and the cup winner, shown together
    Combined {
        /// The two conference championships, in list order
        conference_champions: [&'a Award; 2],
        /// The league championship
        cup: &'a Award,
    },
    /// Closing slide
    Closing,
}

/// Number of slides a phase contributes.
///
/// Intro and Closing always have one; award phases have one per effective
/// award, which is zero for an empty list.
#[must_use]
pub fn slide_count(table: &PhaseTable, phase: Phase) -> usize {
    match phase {
        Phase::Intro | Phase::Closing => 1,
        Phase::Playoffs if table.has_combined_slide() => {
            table.awards(phase).len() - (COMBINED_AWARDS - 1)
        }
        Phase::RegularSeason | Phase::Playoffs | Phase::Suspense => table.awards(phase).len(),
    }
}

/// Maps an effective index to the index of its underlying award.
///
/// For the combined slide this is the first folded award.
#[must_use]
pub fn underlying_index(table: &PhaseTable, phase: Phase, index: usize) -> usize {
    if phase == Phase::Playoffs && table.has_combined_slide() && index >= 1 {
        index + (COMBINED_AWARDS - 1)
    } else {
        index
    }
}

/// Whether `position` is the combined championship slide.
#[must_use]
pub fn is_combined(table: &PhaseTable, position: Position) -> bool {
    position.phase == Phase::Playoffs && position.index == 0 && table.has_combined_slide()
}

/// Resolves the slide shown at `position`.
///
/// Returns `None` for an index outside the phase's slide list.
#[must_use]
pub fn resolve(table: &PhaseTable, position: Position) -> Option<Slide<'_>> {
    match position.phase {
        Phase::Intro => Some(Slide::Intro),
        Phase::Closing => Some(Slide::Closing),
        phase => {
            let awards = table.awards(phase);
            if is_combined(table, position) {
                return Some(Slide::Combined {
                    conference_champions: [&awards[0], &awards[1]],
                    cup: &awards[2],
                });
            }
            awards
                .get(underlying_index(table, phase, position.index))
                .map(Slide::Award)
        }
    }
}

/// The position after `position`, skipping empty phases.
///
/// Returns `None` from Closing.
#[must_use]
pub fn next(table: &PhaseTable, position: Position) -> Option<Position> {
    if position.index + 1 < slide_count(table, position.phase) {
        return Some(Position::new(position.phase, position.index + 1));
    }
    let mut phase = position.phase.successor()?;
    while slide_count(table, phase) == 0 {
        phase = phase.successor()?;
    }
    Some(Position::new(phase, 0))
}

/// The position before `position`, skipping empty phases.
///
/// Returns `None` from Intro.
#[must_use]
pub fn previous(table: &PhaseTable, position: Position) -> Option<Position> {
    if position.index > 0 {
        let last = slide_count(table, position.phase).saturating_sub(1);
        return Some(Position::new(position.phase, (position.index - 1).min(last)));
    }
    let mut phase = position.phase.predecessor()?;
    while slide_count(table, phase) == 0 {
        phase = phase.predecessor()?;
    }
    Some(Position::new(phase, slide_count(table, phase) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombinedSlideConfig;
    use crate::data::test_support::{award, data_set, playoffs_with};
    use proptest::prelude::*;

    fn table(regular: usize, playoffs: Vec<Award>, suspense: usize) -> PhaseTable {
        let regular = (0..regular).map(|i| award(&format!("rs-{i}"))).collect();
        let suspense = (0..suspense).map(|i| award(&format!("su-{i}"))).collect();
        let data = data_set(regular, playoffs, suspense);
        PhaseTable::new(data, &CombinedSlideConfig::default().award_ids).0
    }

    fn award_id<'a>(table: &'a PhaseTable, position: Position) -> &'a str {
        match resolve(table, position) {
            Some(Slide::Award(a)) => a.id.as_str(),
            Some(Slide::Combined { cup, .. }) => cup.id.as_str(),
            other => panic!("expected an award slide, got {other:?}"),
        }
    }

    #[test]
    fn test_combined_slide_remap() {
        let t = table(2, playoffs_with(&["conn-smythe", "jennings"]), 2);
        assert_eq!(slide_count(&t, Phase::Playoffs), 3);

        let combined = Position::new(Phase::Playoffs, 0);
        assert!(matches!(resolve(&t, combined), Some(Slide::Combined { .. })));

        let after = next(&t, combined).unwrap();
        assert_eq!(after, Position::new(Phase::Playoffs, 1));
        assert_eq!(award_id(&t, after), "conn-smythe");
        assert_eq!(underlying_index(&t, Phase::Playoffs, 1), 3);

        assert_eq!(previous(&t, after), Some(combined));
    }

    #[test]
    fn test_combined_slide_contents() {
        let t = table(1, playoffs_with(&["conn-smythe"]), 1);
        let Some(Slide::Combined {
            conference_champions,
            cup,
        }) = resolve(&t, Position::new(Phase::Playoffs, 0))
        else {
            panic!("expected combined slide");
        };
        assert_eq!(conference_champions[0].id, "prince-of-wales");
        assert_eq!(conference_champions[1].id, "campbell-bowl");
        assert_eq!(cup.id, "stanley-cup");
    }

    #[test]
    fn test_only_championships_gives_single_slide() {
        let t = table(1, playoffs_with(&[]), 1);
        assert_eq!(slide_count(&t, Phase::Playoffs), 1);
        let combined = Position::new(Phase::Playoffs, 0);
        assert_eq!(next(&t, combined), Some(Position::new(Phase::Suspense, 0)));
    }

    #[test]
    fn test_without_championships_iterates_per_award() {
        let t = table(1, vec![award("conn-smythe"), award("jennings")], 1);
        assert!(!t.has_combined_slide());
        assert_eq!(slide_count(&t, Phase::Playoffs), 2);
        assert_eq!(award_id(&t, Position::new(Phase::Playoffs, 0)), "conn-smythe");
        assert_eq!(award_id(&t, Position::new(Phase::Playoffs, 1)), "jennings");
    }

    #[test]
    fn test_forward_table() {
        let t = table(2, playoffs_with(&["conn-smythe"]), 2);
        let expected = [
            Position::new(Phase::Intro, 0),
            Position::new(Phase::RegularSeason, 0),
            Position::new(Phase::RegularSeason, 1),
            Position::new(Phase::Playoffs, 0),
            Position::new(Phase::Playoffs, 1),
            Position::new(Phase::Suspense, 0),
            Position::new(Phase::Suspense, 1),
            Position::new(Phase::Closing, 0),
        ];
        let mut at = Position::START;
        for want in &expected[1..] {
            at = next(&t, at).unwrap();
            assert_eq!(at, *want);
        }
        assert_eq!(next(&t, at), None);

        for want in expected.iter().rev().skip(1) {
            at = previous(&t, at).unwrap();
            assert_eq!(at, *want);
        }
        assert_eq!(previous(&t, at), None);
    }

    #[test]
    fn test_empty_phases_skipped() {
        let t = table(0, vec![], 2);
        assert_eq!(
            next(&t, Position::START),
            Some(Position::new(Phase::Suspense, 0))
        );
        assert_eq!(
            previous(&t, Position::new(Phase::Suspense, 0)),
            Some(Position::START)
        );
    }

    #[test]
    fn test_resolve_out_of_range() {
        let t = table(1, vec![], 1);
        assert_eq!(resolve(&t, Position::new(Phase::RegularSeason, 5)), None);
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Next,
        Previous,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![Just(Step::Next), Just(Step::Previous)]
    }

    proptest! {
        #[test]
        fn prop_steps_stay_in_order(
            regular in 0usize..4,
            extra_playoffs in 0usize..3,
            with_championships in any::<bool>(),
            suspense in 0usize..4,
            steps in proptest::collection::vec(step_strategy(), 0..40),
        ) {
            let extra: Vec<String> = (0..extra_playoffs).map(|i| format!("po-{i}")).collect();
            let extra_refs: Vec<&str> = extra.iter().map(String::as_str).collect();
            let playoffs = if with_championships {
                playoffs_with(&extra_refs)
            } else {
                extra_refs.iter().map(|id| award(id)).collect()
            };
            let t = table(regular, playoffs, suspense);

            let mut at = Position::START;
            for step in steps {
                let moved = match step {
                    Step::Next => next(&t, at),
                    Step::Previous => previous(&t, at),
                };
                match (step, moved) {
                    (Step::Next, Some(to)) => prop_assert!(to > at),
                    (Step::Previous, Some(to)) => prop_assert!(to < at),
                    (Step::Next, None) => prop_assert_eq!(at.phase, Phase::Closing),
                    (Step::Previous, None) => prop_assert_eq!(at, Position::START),
                }
                if let Some(to) = moved {
                    prop_assert!(resolve(&t, to).is_some());
                    at = to;
                }
            }
        }
    }
}
