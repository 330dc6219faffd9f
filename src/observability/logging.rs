//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Configure log level from environment or config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Human-readable fmt output on stderr, so CLI JSON on stdout stays clean

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(log_level: &str) -> String {
    format!("dashboard_routes={},tower_http={}", log_level, log_level)
}

/// Install the global subscriber. Call once, from `main`.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
