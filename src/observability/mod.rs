//! Observability module
//!
//! Logging, metrics, and the structured event stream that report what the
//! ceremony is doing while it runs.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EndReason, Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::init_metrics;
