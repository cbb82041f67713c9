//! Structured event stream for the ceremony.
//!
//! Discrete, typed events emitted while a ceremony runs. Events are
//! serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::ceremony::phase::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a ceremony.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Award data loaded and the sequencer started.
    CeremonyStarted {
        /// When the ceremony started.
        timestamp: DateTime<Utc>,
        /// Identifier of this ceremony run.
        session_id: Uuid,
        /// Season requested.
        year: u16,
        /// Where the award data came from (e.g. `"bundled:2024"`).
        source: String,
        /// Number of awards across all phases.
        award_count: usize,
        /// Whether autoplay started enabled.
        autoplay: bool,
    },

    /// The cursor moved to a new slide.
    SlideEntered {
        /// When the slide was entered.
        timestamp: DateTime<Utc>,
        /// Phase entered.
        phase: Phase,
        /// Effective index within the phase.
        award_index: usize,
        /// Award id, `"combined"`, or `"-"` for award-less slides.
        slide: String,
        /// `"forward"` or `"backward"`.
        direction: &'static str,
        /// `"manual"` or `"autoplay"`.
        origin: &'static str,
    },

    /// Part of the current award was revealed.
    RevealProgressed {
        /// When the reveal happened.
        timestamp: DateTime<Utc>,
        /// Current phase.
        phase: Phase,
        /// Effective index within the phase.
        award_index: usize,
        /// Which step: `"heading"`, `"finalist"`, `"all_finalists"`, `"winner"`.
        step: &'static str,
        /// Finalist index for `"finalist"` steps.
        #[serde(skip_serializing_if = "Option::is_none")]
        finalist_index: Option<usize>,
    },

    /// Autoplay was toggled, paused, or resumed.
    AutoplayChanged {
        /// When the change happened.
        timestamp: DateTime<Utc>,
        /// Autoplay switched on.
        enabled: bool,
        /// Autoplay suppressed by a manual interaction.
        paused: bool,
    },

    /// The requested data source failed and bundled data is used instead.
    DataFallback {
        /// When the fallback happened.
        timestamp: DateTime<Utc>,
        /// Requested mode (`"mock"` or `"live"`).
        mode: &'static str,
        /// Why the requested source failed.
        reason: String,
        /// Source actually used.
        source: String,
    },

    /// No award data could be loaded; the ceremony cannot start.
    DataUnavailable {
        /// When loading gave up.
        timestamp: DateTime<Utc>,
        /// Final error.
        reason: String,
    },

    /// The ceremony stopped.
    CeremonyEnded {
        /// When the ceremony stopped.
        timestamp: DateTime<Utc>,
        /// Why it stopped.
        reason: EndReason,
        /// Phase displayed when it stopped.
        phase: Phase,
        /// Final snapshot revision.
        revision: u64,
    },
}

/// Why a ceremony run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// `quit` command
    Quit,
    /// Command input reached end of file
    InputClosed,
    /// Closing slide reached with exit-on-close set
    Closed,
    /// Ctrl+C
    Interrupted,
    /// SIGTERM
    Terminated,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Quit => "quit",
            Self::InputClosed => "input closed",
            Self::Closed => "closing reached",
            Self::Interrupted => "interrupted",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each [`emit`](Self::emit) increments the sequence counter, writes one
/// JSON line and flushes. Serialization or I/O failures are dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}


#[cfg(test)]
mod tests {
    use super::test_writer::TestWriter;
    use super::*;

    fn sample_event() -> Event {
        Event::SlideEntered {
            timestamp: DateTime::parse_from_rfc3339("2025-06-12T20:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            phase: Phase::Suspense,
            award_index: 1,
            slide: "hart".to_owned(),
            direction: "forward",
            origin: "autoplay",
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["type"], "SlideEntered");
        assert_eq!(json["phase"], "suspense");
        assert_eq!(json["slide"], "hart");
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::CeremonyEnded {
            timestamp: Utc::now(),
            reason: EndReason::Quit,
            phase: Phase::Closing,
            revision: 12,
        });

        assert_eq!(emitter.event_count(), 2);
        let lines = tw.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "quit");
        assert!(lines[0].get("event").is_none(), "envelope should flatten");
    }

    #[test]
    fn reveal_omits_missing_finalist_index() {
        let json = serde_json::to_value(Event::RevealProgressed {
            timestamp: Utc::now(),
            phase: Phase::Suspense,
            award_index: 0,
            step: "heading",
            finalist_index: None,
        })
        .unwrap();
        assert!(json.get("finalist_index").is_none());
    }

    #[test]
    fn all_event_variants_serialize() {
        let now = Utc::now();
        let variants = vec![
            Event::CeremonyStarted {
                timestamp: now,
                session_id: Uuid::new_v4(),
                year: 2024,
                source: "bundled:2024".to_owned(),
                award_count: 11,
                autoplay: true,
            },
            sample_event(),
            Event::AutoplayChanged {
                timestamp: now,
                enabled: true,
                paused: true,
            },
            Event::DataFallback {
                timestamp: now,
                mode: "live",
                reason: "connection refused".to_owned(),
                source: "bundled:2024".to_owned(),
            },
            Event::DataUnavailable {
                timestamp: now,
                reason: "no seasons".to_owned(),
            },
        ];
        for variant in &variants {
            let json = serde_json::to_value(variant).unwrap();
            assert!(json.get("type").is_some(), "missing type tag: {json}");
        }
    }
}
