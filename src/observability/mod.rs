//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (fmt subscriber, filtered by RUST_LOG or config)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (organism, view, status) rather than formatted strings
//! - Recording without an installed exporter is a no-op
//! - Every HTTP response carries an `x-request-id`

pub mod logging;
pub mod metrics;
