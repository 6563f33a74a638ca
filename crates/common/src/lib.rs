//! Shared building blocks for the duckquery crates.
//!
//! - **Configuration**: strongly typed session configuration (`config`).
//! - **Telemetry**: `tracing` subscriber setup (`telemetry`).
//! - **Scrubbing**: literal redaction for logged SQL (`scrubber`).
pub mod config;
pub mod ident;
pub mod scrubber;
pub mod telemetry;
