// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for running the preprocessing pipeline.
//!
//! This module contains the command-line interface logic, including argument
//! parsing and the `run`/`split`/`process` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Logging helpers.
pub mod logging;

/// Pipeline drivers.
pub mod run;
