//! MockReel Common Utilities
//!
//! Shared infrastructure for all MockReel crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading (capture hints, sequence timings)

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
