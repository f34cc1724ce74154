// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! Argument parsing, console logging, and the `predict`, `catalog` and
//! `status` commands.

// Modules
/// CLI arguments.
pub mod args;

/// Catalog listing and health report.
pub mod catalog;

/// Console logging macros.
pub mod logging;

/// Prediction logic.
pub mod predict;
