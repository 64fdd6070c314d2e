//! chordline - command-line front end for chord timeline analysis
//!
//! This library provides:
//! - `commands`: subcommand implementations returning printable output
//! - `telemetry`: tracing subscriber setup

pub mod commands;
pub mod telemetry;
