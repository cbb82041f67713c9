//! `ceremony` - Timed reveal-and-reward sequencing for awards ceremonies
//!
//! This library provides the sequencing engine that walks a presenter
//! through an awards show, the data providers that feed it, and the
//! command-line front end that drives it.

pub mod ceremony;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod observability;
