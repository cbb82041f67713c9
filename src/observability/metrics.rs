//! Metrics collection for the ceremony engine.
//!
//! Prometheus-compatible counters and gauges with typed recording helpers.
//! All label values come from closed enums, so cardinality is bounded.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::ceremony::phase::Phase;
use crate::error::CeremonyError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `CeremonyError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), CeremonyError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| CeremonyError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "ceremony_transitions_total",
        "Slide transitions by direction and origin"
    );
    describe_counter!(
        "ceremony_timers_cancelled_total",
        "Pending timers removed by cancellation"
    );
    describe_counter!(
        "ceremony_autoplay_pauses_total",
        "Manual interactions that paused autoplay"
    );
    describe_gauge!(
        "ceremony_current_phase",
        "Currently displayed phase (1 = active)"
    );
    describe_counter!(
        "ceremony_data_fallbacks_total",
        "Award data loads that fell back to the bundled dataset"
    );
}

/// Records a completed slide transition.
pub fn record_transition(direction: &'static str, origin: &'static str) {
    counter!(
        "ceremony_transitions_total",
        "direction" => direction,
        "origin" => origin,
    )
    .increment(1);
}

/// Records timers removed by a cancellation.
pub fn record_timers_cancelled(count: usize) {
    if count > 0 {
        counter!("ceremony_timers_cancelled_total").increment(count as u64);
    }
}

/// Records a manual interaction pausing autoplay.
pub fn record_autoplay_pause() {
    counter!("ceremony_autoplay_pauses_total").increment(1);
}

/// Sets the current-phase gauge, zeroing the previous phase's label.
pub fn set_current_phase(phase: Phase, previous: Option<Phase>) {
    if let Some(prev) = previous.filter(|p| *p != phase) {
        gauge!("ceremony_current_phase", "phase" => prev.as_str()).set(0.0);
    }
    gauge!("ceremony_current_phase", "phase" => phase.as_str()).set(1.0);
}

/// Records a fallback to bundled award data.
pub fn record_data_fallback(mode: &'static str) {
    counter!("ceremony_data_fallbacks_total", "mode" => mode).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_transition("forward", "manual");
        record_timers_cancelled(0);
        record_timers_cancelled(4);
        record_autoplay_pause();
        set_current_phase(Phase::Suspense, Some(Phase::Playoffs));
        set_current_phase(Phase::Suspense, Some(Phase::Suspense));
        record_data_fallback("live");
    }
}
