//! # Burrow Utilities
//!
//! Shared utilities and helpers for Burrow.
//!
//! This crate provides common functionality used across the Burrow
//! workspace, currently the logging bootstrap built on `tracing`. The
//! decoding core emits diagnostics through `tracing` macros; binaries and
//! test harnesses call [`init_logging`] once to route them somewhere
//! useful.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
