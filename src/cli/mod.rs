//! Command-line interface for album-fetch.
//!
//! This module provides commands for resolving albums, acquiring whole
//! albums or single tracks, and checking the produced files and tools.

mod commands;

pub use commands::{Cli, Commands, run_command, run_interactive};
