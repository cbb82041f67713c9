//! Autoplay policy
//!
//! Autoplay is either off, running, or paused by a manual interaction.
//! The sequencer owns the cooldown timer; this type only tracks the flags.

use serde::Serialize;

/// Autoplay on/off flag plus the manual-override pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoplayController {
    enabled: bool,
    paused: bool,
}

impl AutoplayController {
    /// Creates a controller, enabled or not, never paused.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            paused: false,
        }
    }

    /// Whether autoplay is switched on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a manual interaction is suppressing autoplay.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether timed winner reveals and auto-advances may run.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.enabled && !self.paused
    }

    /// Flips the on/off flag and clears any pause.
    ///
    /// Returns the new enabled state.
    pub const fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.paused = false;
        self.enabled
    }

    /// Records a manual interaction.
    ///
    /// Returns `true` when autoplay is enabled, meaning a cooldown should be
    /// (re)started. Returns `false` and changes nothing when autoplay is off.
    pub const fn note_manual(&mut self) -> bool {
        if self.enabled {
            self.paused = true;
        }
        self.enabled
    }

    /// Ends a manual-override pause.
    ///
    /// Returns `true` if autoplay was paused and is now running.
    pub const fn resume(&mut self) -> bool {
        let resumed = self.enabled && self.paused;
        self.paused = false;
        resumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_pauses_only_when_enabled() {
        let mut off = AutoplayController::new(false);
        assert!(!off.note_manual());
        assert!(!off.is_paused());

        let mut on = AutoplayController::new(true);
        assert!(on.note_manual());
        assert!(on.is_paused());
        assert!(!on.is_active());
    }

    #[test]
    fn test_resume() {
        let mut autoplay = AutoplayController::new(true);
        assert!(!autoplay.resume());
        autoplay.note_manual();
        assert!(autoplay.resume());
        assert!(autoplay.is_active());
    }

    #[test]
    fn test_toggle_clears_pause() {
        let mut autoplay = AutoplayController::new(true);
        autoplay.note_manual();
        assert!(!autoplay.toggle());
        assert!(!autoplay.is_paused());
        assert!(autoplay.toggle());
        assert!(autoplay.is_active());
    }
}
