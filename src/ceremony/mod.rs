//! Ceremony engine
//!
//! Phase table, finalist building, the award cursor, the timer queue,
//! autoplay and locking policy, and the sequencer that composes them.

pub mod autoplay;
pub mod cursor;
pub mod finalists;
pub mod lock;
pub mod phase;
pub mod runner;
pub mod scheduler;
pub mod sequencer;
pub mod session;
pub mod snapshot;

pub use cursor::{Position, Slide};
pub use phase::{Phase, PhaseTable};
pub use runner::{CeremonyHandle, Command, spawn_ceremony};
pub use sequencer::{CeremonySequencer, Change, Direction, Origin, RevealStep};
pub use session::RevealState;
pub use snapshot::{CeremonySnapshot, SlideContent};
