//! Async driver
//!
//! Runs a [`CeremonySequencer`] on one tokio task. The task owns the
//! sequencer outright; everything else talks to it through a
//! [`CeremonyHandle`] (commands in, snapshots out).

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::observability::{Event, EventEmitter};

use super::cursor;
use super::phase::PhaseTable;
use super::sequencer::{CeremonySequencer, Change, RevealStep};
use super::snapshot::{CeremonySnapshot, SlideContent};

/// Command channel capacity.
const COMMAND_BUFFER: usize = 32;

/// Presenter commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Next slide
    Next,
    /// Previous slide
    Previous,
    /// Flip autoplay
    ToggleAutoplay,
    /// Show every finalist of the current award
    RevealFinalists,
    /// Show the winner of the current award
    RevealWinner,
}

/// Handle to a running ceremony.
#[derive(Debug, Clone)]
pub struct CeremonyHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<CeremonySnapshot>,
    cancel: CancellationToken,
}

impl CeremonyHandle {
    /// Sends a command. Returns `false` if the ceremony has stopped.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CeremonySnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CeremonySnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stops the ceremony. The loop disposes the sequencer before exiting.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Starts `sequencer` on a new task.
///
/// The task resolves to the final snapshot after shutdown, or after every
/// handle has been dropped.
pub fn spawn_ceremony(
    mut sequencer: CeremonySequencer,
    emitter: Arc<EventEmitter>,
) -> (CeremonyHandle, JoinHandle<CeremonySnapshot>) {
    sequencer.start();
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(sequencer.snapshot());
    let cancel = CancellationToken::new();

    let handle = CeremonyHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        cancel: cancel.clone(),
    };
    let task = tokio::spawn(run_loop(sequencer, command_rx, snapshot_tx, cancel, emitter));
    (handle, task)
}

async fn run_loop(
    mut sequencer: CeremonySequencer,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<CeremonySnapshot>,
    cancel: CancellationToken,
    emitter: Arc<EventEmitter>,
) -> CeremonySnapshot {
    let mut published = sequencer.snapshot().revision;
    loop {
        let deadline = sequencer.next_deadline();
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("ceremony loop cancelled");
                break;
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("all ceremony handles dropped");
                    break;
                };
                apply(&mut sequencer, command);
            }
            () = wait_until(deadline) => {
                sequencer.fire_due(Instant::now());
            }
        }
        let changes = sequencer.drain_changes();
        emit_changes(&emitter, sequencer.table(), changes);
        publish(&sequencer, &snapshots, &mut published);
    }

    sequencer.dispose();
    let last = sequencer.snapshot();
    let _ = snapshots.send(last.clone());
    last
}

fn apply(sequencer: &mut CeremonySequencer, command: Command) {
    debug!(?command, "command received");
    let acted = match command {
        Command::Next => sequencer.next(),
        Command::Previous => sequencer.previous(),
        Command::ToggleAutoplay => {
            sequencer.toggle_autoplay();
            true
        }
        Command::RevealFinalists => sequencer.reveal_finalists_now(),
        Command::RevealWinner => sequencer.reveal_winner_now(),
    };
    if !acted {
        debug!(?command, position = %sequencer.position(), "command had no effect");
    }
}

fn publish(sequencer: &CeremonySequencer, snapshots: &watch::Sender<CeremonySnapshot>, published: &mut u64) {
    let snapshot = sequencer.snapshot();
    if snapshot.revision == *published {
        return;
    }
    *published = snapshot.revision;
    if snapshots.send(snapshot).is_err() {
        debug!("no snapshot subscribers left");
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn emit_changes(emitter: &EventEmitter, table: &PhaseTable, changes: Vec<Change>) {
    for change in changes {
        let timestamp = Utc::now();
        let event = match change {
            Change::SlideEntered {
                to,
                direction,
                origin,
                ..
            } => Event::SlideEntered {
                timestamp,
                phase: to.phase,
                award_index: to.index,
                slide: cursor::resolve(table, to)
                    .map_or(SlideContent::None, SlideContent::from)
                    .label()
                    .to_owned(),
                direction: direction.as_str(),
                origin: origin.as_str(),
            },
            Change::RevealProgressed { position, step } => Event::RevealProgressed {
                timestamp,
                phase: position.phase,
                award_index: position.index,
                step: step.as_str(),
                finalist_index: match step {
                    RevealStep::Finalist(k) => Some(k),
                    _ => None,
                },
            },
            Change::AutoplayChanged { enabled, paused } => Event::AutoplayChanged {
                timestamp,
                enabled,
                paused,
            },
        };
        emitter.emit(event);
    }
}
