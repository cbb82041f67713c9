//! Session state
//!
//! The sequencer's mutable state: cursor position, reveal progress, and
//! the bookkeeping that feeds snapshots.

use std::collections::BTreeSet;

use serde::Serialize;

use super::cursor::Position;

/// Reveal progress of the current award.
///
/// Reset to empty on every cursor move. While an award stays current the
/// visible finalist set only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealState {
    /// Trophy title and finalists heading shown
    pub heading_shown: bool,
    /// Indices of finalists currently visible
    pub visible_finalist_indices: BTreeSet<usize>,
    /// Winner revealed
    pub winner_revealed: bool,
}

impl RevealState {
    /// Clears all reveal progress.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Shows the heading. Returns `true` if it was hidden.
    pub const fn show_heading(&mut self) -> bool {
        let changed = !self.heading_shown;
        self.heading_shown = true;
        changed
    }

    /// Makes finalist `k` visible. Re-adding a visible index is a no-op.
    ///
    /// Returns `true` if the index was newly added.
    pub fn show_finalist(&mut self, k: usize) -> bool {
        self.visible_finalist_indices.insert(k)
    }

    /// Shows the heading and all `count` finalists.
    ///
    /// Returns `true` if anything changed.
    pub fn show_all_finalists(&mut self, count: usize) -> bool {
        let heading = self.show_heading();
        let added = (0..count).fold(false, |acc, k| self.show_finalist(k) | acc);
        heading || added
    }

    /// Reveals the winner. Returns `true` if it was hidden.
    pub const fn reveal_winner(&mut self) -> bool {
        let changed = !self.winner_revealed;
        self.winner_revealed = true;
        changed
    }

    /// Shows everything at once, for immediate-reveal slides.
    pub fn reveal_all(&mut self, count: usize) {
        self.show_all_finalists(count);
        self.reveal_winner();
    }

    /// Whether all `count` finalists are visible.
    #[must_use]
    pub fn all_finalists_visible(&self, count: usize) -> bool {
        (0..count).all(|k| self.visible_finalist_indices.contains(&k))
    }

    /// Whether nothing has been revealed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.heading_shown && self.visible_finalist_indices.is_empty() && !self.winner_revealed
    }
}

/// The engine's single mutable state record.
#[derive(Debug, Clone)]
pub struct CeremonySession {
    /// Cursor position
    pub position: Position,
    /// Reveal progress of the current slide
    pub reveal: RevealState,
    /// Incremented on every observable change
    pub revision: u64,
    /// Set by `dispose`; every later operation is a no-op
    pub disposed: bool,
}

impl CeremonySession {
    /// Creates a session at the start position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Position::START,
            reveal: RevealState::default(),
            revision: 0,
            disposed: false,
        }
    }

    /// Moves the cursor and clears reveal progress.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.reveal.reset();
    }

    /// Records an observable change.
    pub const fn touch(&mut self) {
        self.revision += 1;
    }
}

impl Default for CeremonySession {
    fn default() -> Self {
        Self::new()
    }
}
