//! Ceremony sequencer
//!
//! Composes the cursor, timer queue, autoplay policy and navigation lock
//! into the engine's public operations. All state lives in one
//! [`CeremonySession`]; every operation that moves the cursor cancels the
//! whole timer queue before changing position.
//!
//! The sequencer never sleeps. Each public operation reads
//! `tokio::time::Instant::now()` and delegates to an `_at(now)` variant;
//! the owner drives time by calling [`CeremonySequencer::fire_due`] when
//! [`CeremonySequencer::next_deadline`] passes.

use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::config::Timing;
use crate::data::Award;
use crate::observability::metrics;

use super::autoplay::AutoplayController;
use super::cursor::{self, Position, Slide};
use super::lock::NavigationLock;
use super::phase::{PhaseProfile, PhaseTable, RevealStyle};
use super::scheduler::{DueTimer, Lane, TimerAction, TimerQueue, deadline_after};
use super::session::CeremonySession;
use super::snapshot::{CeremonySnapshot, SlideContent};

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward Closing
    Forward,
    /// Toward Intro
    Backward,
}

impl Direction {
    /// Metrics and event label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// Who initiated an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A presenter command
    Manual,
    /// An autoplay timer
    Autoplay,
}

impl Origin {
    /// Metrics and event label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Autoplay => "autoplay",
        }
    }
}

/// One step of reveal progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// Trophy title and finalists heading
    Heading,
    /// A single finalist
    Finalist(usize),
    /// Every finalist at once
    AllFinalists,
    /// The winner
    Winner,
}

impl RevealStep {
    /// Event label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Finalist(_) => "finalist",
            Self::AllFinalists => "all_finalists",
            Self::Winner => "winner",
        }
    }
}

/// Observable change, drained by the owner after each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The cursor moved.
    SlideEntered {
        /// Position left
        from: Position,
        /// Position entered
        to: Position,
        /// Navigation direction
        direction: Direction,
        /// Who triggered it
        origin: Origin,
    },
    /// Reveal progress on the current slide.
    RevealProgressed {
        /// Current position
        position: Position,
        /// What was revealed
        step: RevealStep,
    },
    /// Autoplay flags changed.
    AutoplayChanged {
        /// Autoplay switched on
        enabled: bool,
        /// Autoplay paused by a manual interaction
        paused: bool,
    },
}

/// The ceremony state machine.
#[derive(Debug)]
pub struct CeremonySequencer {
    table: PhaseTable,
    timing: Timing,
    session: CeremonySession,
    autoplay: AutoplayController,
    lock: NavigationLock,
    timers: TimerQueue,
    entered_at: Option<Instant>,
    changes: Vec<Change>,
}

impl CeremonySequencer {
    /// Creates a sequencer positioned on Intro.
    ///
    /// Nothing is scheduled until [`start`](Self::start) is called.
    #[must_use]
    pub fn new(table: PhaseTable, timing: Timing, autoplay: bool) -> Self {
        Self {
            table,
            timing,
            session: CeremonySession::new(),
            autoplay: AutoplayController::new(autoplay),
            lock: NavigationLock::new(),
            timers: TimerQueue::new(),
            entered_at: None,
            changes: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Enters the Intro slide and schedules its autoplay step.
    ///
    /// Calling it again is a no-op.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Moves one slide forward. Returns `true` if the cursor moved.
    pub fn next(&mut self) -> bool {
        self.next_at(Instant::now())
    }

    /// Moves one slide backward. Returns `true` if the cursor moved.
    pub fn previous(&mut self) -> bool {
        self.previous_at(Instant::now())
    }

    /// Flips autoplay and clears any pause. Returns the new enabled state.
    pub fn toggle_autoplay(&mut self) -> bool {
        self.toggle_autoplay_at(Instant::now())
    }

    /// Shows the heading and every finalist of the current staggered slide.
    ///
    /// Returns `true` if anything became visible.
    pub fn reveal_finalists_now(&mut self) -> bool {
        self.reveal_finalists_now_at(Instant::now())
    }

    /// Shows all finalists and the winner of the current staggered slide.
    ///
    /// Returns `true` if anything became visible.
    pub fn reveal_winner_now(&mut self) -> bool {
        self.reveal_winner_now_at(Instant::now())
    }

    /// Cancels every timer and releases the lock. Later operations are no-ops.
    pub fn dispose(&mut self) {
        if self.session.disposed {
            return;
        }
        let cancelled = self.timers.cancel_all();
        metrics::record_timers_cancelled(cancelled);
        self.lock.release();
        self.session.disposed = true;
        self.session.touch();
        debug!(cancelled, "sequencer disposed");
    }

    /// Fires every timer due at or before `now`, in deadline order.
    ///
    /// Each timer runs with its own deadline as the current time, so chained
    /// steps keep their exact offsets. Returns the number of timers fired.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            fired += 1;
            self.fire(timer);
        }
        fired
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Removes and returns changes recorded since the last drain.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    /// Builds a snapshot of the current display state.
    #[must_use]
    pub fn snapshot(&self) -> CeremonySnapshot {
        let position = self.session.position;
        CeremonySnapshot {
            phase: position.phase,
            award_index: position.index,
            slide: cursor::resolve(&self.table, position).map_or(SlideContent::None, SlideContent::from),
            reveal: self.session.reveal.clone(),
            autoplay_enabled: self.autoplay.is_enabled(),
            autoplay_paused: self.autoplay.is_paused(),
            transitioning: self.lock.is_held(),
            is_first: cursor::previous(&self.table, position).is_none(),
            is_last: cursor::next(&self.table, position).is_none(),
            revision: self.session.revision,
        }
    }

    /// Current cursor position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.session.position
    }

    /// The phase table being iterated.
    #[must_use]
    pub const fn table(&self) -> &PhaseTable {
        &self.table
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // ------------------------------------------------------------------
    // Clock-explicit variants
    // ------------------------------------------------------------------

    /// [`start`](Self::start) at an explicit instant.
    pub fn start_at(&mut self, now: Instant) {
        if self.session.disposed || self.entered_at.is_some() {
            return;
        }
        info!(
            awards = self.table.award_count(),
            autoplay = self.autoplay.is_enabled(),
            "ceremony started"
        );
        metrics::set_current_phase(self.session.position.phase, None);
        self.enter_slide(now);
        self.session.touch();
    }

    /// [`next`](Self::next) at an explicit instant.
    pub fn next_at(&mut self, now: Instant) -> bool {
        self.navigate(now, Direction::Forward, Origin::Manual)
    }

    /// [`previous`](Self::previous) at an explicit instant.
    pub fn previous_at(&mut self, now: Instant) -> bool {
        self.navigate(now, Direction::Backward, Origin::Manual)
    }

    /// [`toggle_autoplay`](Self::toggle_autoplay) at an explicit instant.
    pub fn toggle_autoplay_at(&mut self, now: Instant) -> bool {
        if self.session.disposed {
            return self.autoplay.is_enabled();
        }
        let enabled = self.autoplay.toggle();
        self.timers
            .cancel_action(Lane::Control, TimerAction::ResumeAutoplay);
        if enabled {
            self.plan_autoplay(now);
        } else {
            let cancelled = self.timers.cancel_lane(Lane::Autoplay);
            metrics::record_timers_cancelled(cancelled);
        }
        info!(enabled, "autoplay toggled");
        self.autoplay_changed();
        self.session.touch();
        enabled
    }

    /// [`reveal_finalists_now`](Self::reveal_finalists_now) at an explicit instant.
    pub fn reveal_finalists_now_at(&mut self, now: Instant) -> bool {
        let Some(count) = self.staggered_finalist_count() else {
            return false;
        };
        let cancelled = self.timers.cancel_lane(Lane::Reveal);
        metrics::record_timers_cancelled(cancelled);
        let changed = self.session.reveal.show_all_finalists(count);
        if changed {
            self.reveal_progressed(RevealStep::AllFinalists);
        }
        self.manual_interaction(now);
        self.session.touch();
        changed
    }

    /// [`reveal_winner_now`](Self::reveal_winner_now) at an explicit instant.
    pub fn reveal_winner_now_at(&mut self, now: Instant) -> bool {
        let Some(count) = self.staggered_finalist_count() else {
            return false;
        };
        let mut cancelled = self.timers.cancel_lane(Lane::Reveal);
        cancelled += self
            .timers
            .cancel_action(Lane::Autoplay, TimerAction::RevealWinner);
        metrics::record_timers_cancelled(cancelled);

        let shown = self.session.reveal.show_all_finalists(count);
        if shown {
            self.reveal_progressed(RevealStep::AllFinalists);
        }
        let revealed = self.session.reveal.reveal_winner();
        if revealed {
            self.reveal_progressed(RevealStep::Winner);
        }
        self.manual_interaction(now);
        self.session.touch();
        shown || revealed
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn navigate(&mut self, now: Instant, direction: Direction, origin: Origin) -> bool {
        if self.session.disposed {
            return false;
        }
        let from = self.session.position;
        let target = match direction {
            Direction::Forward => cursor::next(&self.table, from),
            Direction::Backward => cursor::previous(&self.table, from),
        };
        let Some(to) = target else {
            trace!(position = %from, direction = direction.as_str(), "no slide in that direction");
            return false;
        };
        let Some(guard) = self.lock.try_acquire() else {
            debug!(position = %from, direction = direction.as_str(), "navigation ignored: transition settling");
            return false;
        };

        let cancelled = self.timers.cancel_all();
        metrics::record_timers_cancelled(cancelled);
        self.session.move_to(to);

        if origin == Origin::Manual {
            self.manual_interaction(now);
        }

        self.enter_slide(now);
        self.timers
            .schedule_after(now, self.timing.settle_delay, Lane::Control, TimerAction::ReleaseLock);
        guard.hold();

        metrics::record_transition(direction.as_str(), origin.as_str());
        if from.phase != to.phase {
            metrics::set_current_phase(to.phase, Some(from.phase));
        }
        info!(
            from = %from,
            to = %to,
            origin = origin.as_str(),
            cancelled,
            "slide entered"
        );
        self.changes.push(Change::SlideEntered {
            from,
            to,
            direction,
            origin,
        });
        self.session.touch();
        true
    }

    /// Applies the entry behavior of the current slide.
    fn enter_slide(&mut self, now: Instant) {
        self.entered_at = Some(now);
        let profile = PhaseProfile::for_phase(self.session.position.phase, &self.timing);
        match profile.reveal {
            RevealStyle::None => {}
            RevealStyle::Immediate => {
                let count = self.current_award().map_or(0, |a| a.finalists().len());
                self.session.reveal.reveal_all(count);
            }
            RevealStyle::Staggered => {
                let count = self.current_award().map_or(0, |a| a.finalists().len());
                self.timers.schedule_after(
                    now,
                    self.timing.trophy_title_delay,
                    Lane::Reveal,
                    TimerAction::ShowHeading,
                );
                for k in 0..count {
                    self.timers.schedule_after(
                        now,
                        self.timing.finalist_offset(k),
                        Lane::Reveal,
                        TimerAction::ShowFinalist(k),
                    );
                }
            }
        }
        if self.autoplay.is_active() {
            self.plan_autoplay(now);
        }
    }

    /// Replaces the autoplay lane with the steps that remain for the current
    /// slide, given its reveal progress at `now`.
    fn plan_autoplay(&mut self, now: Instant) {
        self.timers.cancel_lane(Lane::Autoplay);
        let profile = PhaseProfile::for_phase(self.session.position.phase, &self.timing);

        if profile.reveal == RevealStyle::Staggered {
            let count = self.current_award().map_or(0, |a| a.finalists().len());
            let reveal = &self.session.reveal;
            if reveal.winner_revealed {
                self.timers.schedule_after(
                    now,
                    self.timing.winner_view_duration,
                    Lane::Autoplay,
                    TimerAction::AutoAdvance,
                );
                return;
            }
            let finalists_done = if reveal.all_finalists_visible(count) {
                now
            } else {
                let entered = self.entered_at.unwrap_or(now);
                let finalists_offset = self
                    .timing
                    .winner_offset(count)
                    .saturating_sub(self.timing.winner_reveal_delay);
                deadline_after(entered, finalists_offset).max(now)
            };
            let winner_at = deadline_after(finalists_done, self.timing.winner_reveal_delay);
            self.timers
                .schedule(winner_at, Lane::Autoplay, TimerAction::RevealWinner);
            self.timers.schedule(
                deadline_after(winner_at, self.timing.winner_view_duration),
                Lane::Autoplay,
                TimerAction::AutoAdvance,
            );
        } else if let Some(dwell) = profile.dwell {
            self.timers
                .schedule_after(now, dwell, Lane::Autoplay, TimerAction::AutoAdvance);
        }
    }

    /// Pauses autoplay and (re)starts the cooldown, if autoplay is on.
    fn manual_interaction(&mut self, now: Instant) {
        if !self.autoplay.note_manual() {
            return;
        }
        let mut cancelled = self.timers.cancel_lane(Lane::Autoplay);
        cancelled += self
            .timers
            .cancel_action(Lane::Control, TimerAction::ResumeAutoplay);
        metrics::record_timers_cancelled(cancelled);
        self.timers.schedule_after(
            now,
            self.timing.manual_override_cooldown,
            Lane::Control,
            TimerAction::ResumeAutoplay,
        );
        metrics::record_autoplay_pause();
        debug!(
            cooldown = %humantime::format_duration(self.timing.manual_override_cooldown),
            "autoplay paused by manual interaction"
        );
        self.autoplay_changed();
    }

    fn fire(&mut self, timer: DueTimer) {
        let at = timer.deadline;
        trace!(action = ?timer.action, lane = ?timer.lane, "timer fired");
        match timer.action {
            TimerAction::ShowHeading => {
                if self.session.reveal.show_heading() {
                    self.reveal_progressed(RevealStep::Heading);
                    self.session.touch();
                }
            }
            TimerAction::ShowFinalist(k) => {
                if self.session.reveal.show_finalist(k) {
                    self.reveal_progressed(RevealStep::Finalist(k));
                    self.session.touch();
                }
            }
            TimerAction::RevealWinner => {
                if self.autoplay.is_active() && self.session.reveal.reveal_winner() {
                    self.reveal_progressed(RevealStep::Winner);
                    self.session.touch();
                }
            }
            TimerAction::AutoAdvance => {
                if !self.autoplay.is_active() {
                    return;
                }
                if self.lock.is_held() {
                    let retry = self
                        .timers
                        .deadline_of(Lane::Control, TimerAction::ReleaseLock)
                        .unwrap_or_else(|| deadline_after(at, self.timing.settle_delay));
                    debug!("auto-advance deferred until the transition settles");
                    self.timers
                        .schedule(retry, Lane::Autoplay, TimerAction::AutoAdvance);
                    return;
                }
                self.navigate(at, Direction::Forward, Origin::Autoplay);
            }
            TimerAction::ReleaseLock => {
                self.lock.release();
                self.session.touch();
            }
            TimerAction::ResumeAutoplay => {
                if self.autoplay.resume() {
                    debug!("autoplay resumed after cooldown");
                    self.plan_autoplay(at);
                    self.autoplay_changed();
                    self.session.touch();
                }
            }
        }
    }

    /// The single award of the current slide; the cup for the combined slide.
    fn current_award(&self) -> Option<&Award> {
        match cursor::resolve(&self.table, self.session.position)? {
            Slide::Award(award) | Slide::Combined { cup: award, .. } => Some(award),
            Slide::Intro | Slide::Closing => None,
        }
    }

    /// Finalist count of the current slide, when it reveals in stages.
    fn staggered_finalist_count(&self) -> Option<usize> {
        if self.session.disposed {
            return None;
        }
        let profile = PhaseProfile::for_phase(self.session.position.phase, &self.timing);
        if profile.reveal != RevealStyle::Staggered {
            return None;
        }
        self.current_award().map(|a| a.finalists().len())
    }

    fn reveal_progressed(&mut self, step: RevealStep) {
        self.changes.push(Change::RevealProgressed {
            position: self.session.position,
            step,
        });
    }

    fn autoplay_changed(&mut self) {
        self.changes.push(Change::AutoplayChanged {
            enabled: self.autoplay.is_enabled(),
            paused: self.autoplay.is_paused(),
        });
    }
}
