//! Command-line interface
//!
//! Argument definitions and command handlers for the `ceremony` binary.

pub mod args;
pub mod commands;
pub mod input;
