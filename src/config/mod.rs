//! Configuration module
//!
//! Loads and validates the ceremony timing configuration.

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, LoadResult};
pub use schema::{CeremonyConfig, CombinedSlideConfig, Timing};
