//! ABP Core - Backend logic for Audio Batch Processor
//!
//! Trims audio files and wraps them with intro/outro clips by driving an
//! external media engine. Zero UI dependencies; the `audio-batch` CLI is
//! one front end.

pub mod commands;
pub mod config;
pub mod driver;
pub mod engine;
pub mod logging;
pub mod models;
pub mod session;
pub mod wizard;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
