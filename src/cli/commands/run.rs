//! `ceremony run`
//!
//! Loads award data (falling back to the bundled dataset), starts the
//! sequencer on the runner task, prints every snapshot as a JSON line on
//! stdout, and feeds presenter commands read from stdin.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ceremony::{
    CeremonyHandle, CeremonySequencer, CeremonySnapshot, Phase, PhaseTable, spawn_ceremony,
};
use crate::cli::args::RunArgs;
use crate::cli::commands::Shutdown;
use crate::cli::input::{self, Input};
use crate::config::ConfigLoader;
use crate::data::{LoadOptions, load_award_data};
use crate::error::CeremonyError;
use crate::observability::{EndReason, Event, EventEmitter, metrics};

/// Run a ceremony until stdin closes, `quit`, a signal, or Closing with
/// `--exit-on-close`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the event sink or
/// metrics listener cannot be opened, or no award data can be loaded.
pub async fn run(args: &RunArgs, shutdown: Shutdown) -> Result<(), CeremonyError> {
    let loaded = ConfigLoader::new().load(args.config.as_deref())?;
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    let config = loaded.config;

    if let Some(port) = args.metrics_port {
        metrics::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let emitter = Arc::new(open_emitter(args.events.as_deref())?);

    let mut options = LoadOptions {
        data_file: args.data.clone(),
        ..LoadOptions::default()
    };
    if let Some(url) = &args.live_url {
        options.live_url.clone_from(url);
    }

    let mut rng = StdRng::from_os_rng();
    let outcome = match load_award_data(args.mode, args.year, &options, &mut rng).await {
        Ok(outcome) => outcome,
        Err(e) => {
            emitter.emit(Event::DataUnavailable {
                timestamp: Utc::now(),
                reason: e.to_string(),
            });
            return Err(e.into());
        }
    };

    if let Some(reason) = &outcome.fallback_reason {
        metrics::record_data_fallback(args.mode.as_str());
        emitter.emit(Event::DataFallback {
            timestamp: Utc::now(),
            mode: args.mode.as_str(),
            reason: reason.clone(),
            source: outcome.source.to_string(),
        });
    }

    let (table, issues) = PhaseTable::new(outcome.data, &config.combined_slide.award_ids);
    for issue in &issues {
        warn!(%issue, "award data shape issue");
    }

    let autoplay = config.autoplay && !args.no_autoplay;
    let session_id = Uuid::new_v4();
    emitter.emit(Event::CeremonyStarted {
        timestamp: Utc::now(),
        session_id,
        year: args.year,
        source: outcome.source.to_string(),
        award_count: table.award_count(),
        autoplay,
    });
    info!(%session_id, source = %outcome.source, autoplay, "ceremony started");

    let sequencer = CeremonySequencer::new(table, config.timing, autoplay);
    let (handle, task) = spawn_ceremony(sequencer, Arc::clone(&emitter));
    let printer = tokio::spawn(print_snapshots(handle.subscribe()));

    let reason = drive(&handle, args.exit_on_close, &shutdown).await;
    handle.shutdown();

    let last = match task.await {
        Ok(last) => last,
        Err(e) => {
            warn!(error = %e, "ceremony task failed");
            handle.snapshot()
        }
    };
    drop(handle);
    if let Err(e) = printer.await {
        debug!(error = %e, "snapshot printer stopped abnormally");
    }

    emitter.emit(Event::CeremonyEnded {
        timestamp: Utc::now(),
        reason,
        phase: last.phase,
        revision: last.revision,
    });
    info!(%reason, phase = %last.phase, revision = last.revision, "ceremony ended");
    Ok(())
}

/// Opens the event sink named by `--events`.
fn open_emitter(target: Option<&str>) -> Result<EventEmitter, CeremonyError> {
    Ok(match target {
        None | Some("stderr") => EventEmitter::stderr(),
        Some("stdout") => EventEmitter::stdout(),
        Some(path) => EventEmitter::from_file(Path::new(path))?,
    })
}

/// Feeds stdin commands to the ceremony until something ends the run.
async fn drive(handle: &CeremonyHandle, exit_on_close: bool, shutdown: &Shutdown) -> EndReason {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut snapshots = handle.subscribe();

    loop {
        tokio::select! {
            reason = shutdown.wait() => return reason,
            _ = snapshots.wait_for(|s| s.phase == Phase::Closing), if exit_on_close => {
                return EndReason::Closed;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => return EndReason::InputClosed,
                    Err(e) => {
                        warn!(error = %e, "failed to read command input");
                        return EndReason::InputClosed;
                    }
                };
                match input::parse_line(&line) {
                    Ok(Input::Command(command)) => {
                        if !handle.send(command).await {
                            return EndReason::Closed;
                        }
                    }
                    Ok(Input::Quit) => return EndReason::Quit,
                    Ok(Input::Empty) => {}
                    Err(unknown) => eprintln!("{unknown}; commands: {}", input::help_line()),
                }
            }
        }
    }
}

/// Writes every published snapshot to stdout as one JSON line.
async fn print_snapshots(rx: watch::Receiver<CeremonySnapshot>) {
    let mut stream = WatchStream::new(rx);
    while let Some(snapshot) = stream.next().await {
        let line = match serde_json::to_string(&snapshot) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize snapshot");
                continue;
            }
        };
        let mut out = std::io::stdout().lock();
        if writeln!(out, "{line}").and_then(|()| out.flush()).is_err() {
            debug!("stdout closed; no longer printing snapshots");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_emitter_targets() {
        assert!(open_emitter(None).is_ok());
        assert!(open_emitter(Some("stdout")).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let emitter = open_emitter(Some(path.to_str().unwrap())).unwrap();
        emitter.emit(Event::DataUnavailable {
            timestamp: Utc::now(),
            reason: "test".to_string(),
        });
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("DataUnavailable"));
    }

    #[test]
    fn test_open_emitter_bad_path() {
        let err = open_emitter(Some("/nonexistent-dir/events.jsonl")).unwrap_err();
        assert!(matches!(err, CeremonyError::Io(_)));
    }
}
