//! Common utilities and configuration shared across mylite crates.
//!
//! - **Configuration**: Strongly typed application configuration (`config`).
//! - **Resilience**: Bounded blocking retry for engine contention (`retry`).
//! - **Telemetry**: Tracing subscriber setup (`telemetry`).
//! - **Logging**: Statement scrubbing before SQL reaches the logs (`scrubber`).
pub mod config;
pub mod retry;
pub mod scrubber;
pub mod telemetry;
