//! Timer queue
//!
//! Every delayed reveal and auto-advance is an entry in a [`TimerQueue`]
//! keyed by an absolute deadline. The queue never sleeps itself; the runner
//! waits on [`TimerQueue::next_deadline`] and drains due entries with
//! [`TimerQueue::pop_due`].
//!
//! Entries are tagged with the generation they were scheduled under.
//! [`TimerQueue::cancel_all`] bumps the generation, so an entry that escapes
//! removal can still be recognized as stale and dropped at fire time.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

/// Opaque handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// Independent timer groups that can be cancelled separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Staggered disclosure of heading and finalists
    Reveal,
    /// Autoplay-driven steps: winner reveal and auto-advance
    Autoplay,
    /// Navigation lock release and autoplay resume
    Control,
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Show the trophy title and finalists heading
    ShowHeading,
    /// Show finalist `k`
    ShowFinalist(usize),
    /// Reveal the winner
    RevealWinner,
    /// Advance to the next slide
    AutoAdvance,
    /// Clear the navigation lock
    ReleaseLock,
    /// End a manual-override pause
    ResumeAutoplay,
}

/// A timer that has come due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTimer {
    /// When it was due
    pub deadline: Instant,
    /// Group it belongs to
    pub lane: Lane,
    /// What to do
    pub action: TimerAction,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    lane: Lane,
    action: TimerAction,
    generation: u64,
}

/// Deadline-ordered set of pending timers.
///
/// Entries with equal deadlines fire in scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(Instant, TimerHandle), Entry>,
    next_handle: u64,
    generation: u64,
}

impl TimerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, lane: Lane, action: TimerAction) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(
            (deadline, handle),
            Entry {
                lane,
                action,
                generation: self.generation,
            },
        );
        handle
    }

    /// Schedules `action` to fire `delay` after `now`.
    ///
    /// A delay past the clock's range is clamped rather than overflowing.
    pub fn schedule_after(
        &mut self,
        now: Instant,
        delay: Duration,
        lane: Lane,
        action: TimerAction,
    ) -> TimerHandle {
        self.schedule(deadline_after(now, delay), lane, action)
    }

    /// Cancels every pending timer and starts a new generation.
    ///
    /// Returns the number of timers removed.
    pub fn cancel_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.generation += 1;
        removed
    }

    /// Cancels every pending timer in `lane`.
    ///
    /// Returns the number of timers removed.
    pub fn cancel_lane(&mut self, lane: Lane) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.lane != lane);
        before - self.entries.len()
    }

    /// Cancels timers in `lane` whose action matches `action`.
    pub fn cancel_action(&mut self, lane: Lane, action: TimerAction) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !(entry.lane == lane && entry.action == action));
        before - self.entries.len()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    ///
    /// Timers from an earlier generation are discarded silently.
    pub fn pop_due(&mut self, now: Instant) -> Option<DueTimer> {
        loop {
            let (&(deadline, handle), _) = self.entries.first_key_value()?;
            if deadline > now {
                return None;
            }
            let entry = self.entries.remove(&(deadline, handle))?;
            if entry.generation != self.generation {
                continue;
            }
            return Some(DueTimer {
                deadline,
                lane: entry.lane,
                action: entry.action,
            });
        }
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Deadline of the pending `action` in `lane`, if any.
    #[must_use]
    pub fn deadline_of(&self, lane: Lane, action: TimerAction) -> Option<Instant> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.lane == lane && entry.action == action)
            .map(|(&(deadline, _), _)| deadline)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Roughly thirty years; stands in for a deadline the clock cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + delay`, clamped instead of overflowing.
#[must_use]
pub fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
