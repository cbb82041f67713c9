//! Award finalist builder
//!
//! Turns a winner plus a raw finalist list into the ordered list shown on
//! screen: duplicates of the winner removed, padded with placeholders until
//! at least two rivals exist, and the winner spliced in at a random slot
//! among the first three so the reveal keeps some suspense.

use rand::Rng;

use crate::data::Nominee;

/// Minimum number of non-winner entries in a built finalist list.
pub const MIN_RIVALS: usize = 2;

/// Team code carried by synthesized placeholder finalists.
pub const PLACEHOLDER_TEAM: &str = "TBD";

/// Builds the display finalist list for one award.
///
/// The result always contains `winner` and has at least `MIN_RIVALS + 1`
/// entries. The winner lands uniformly at index 0, 1, or 2.
pub fn build_finalists<R: Rng + ?Sized>(
    winner: &Nominee,
    raw: &[Nominee],
    rng: &mut R,
) -> Vec<Nominee> {
    let mut finalists: Vec<Nominee> = raw
        .iter()
        .filter(|n| !n.is_same_nominee(winner))
        .cloned()
        .collect();

    while finalists.len() < MIN_RIVALS {
        finalists.push(placeholder(finalists.len() + 1));
    }

    let slot = rng.random_range(0..=MIN_RIVALS);
    finalists.insert(slot, winner.clone());
    finalists
}

/// Number of non-winner entries in `raw`, before padding.
#[must_use]
pub fn rival_count(winner: &Nominee, raw: &[Nominee]) -> usize {
    raw.iter().filter(|n| !n.is_same_nominee(winner)).count()
}

/// Re-inserts `winner` at the front of `finalists` if it is missing.
///
/// Returns `true` if the list had to be repaired.
pub fn heal_missing_winner(winner: &Nominee, finalists: &mut Vec<Nominee>) -> bool {
    if finalists.iter().any(|n| n.is_same_nominee(winner)) {
        return false;
    }
    finalists.insert(0, winner.clone());
    true
}

fn placeholder(n: usize) -> Nominee {
    Nominee {
        name: format!("Finalist {n}"),
        team_code: Some(PLACEHOLDER_TEAM.to_string()),
        stats: indexmap::IndexMap::new(),
    }
}
