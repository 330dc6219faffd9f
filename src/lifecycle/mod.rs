//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One watch flag; every long-running task subscribes, late subscribers included
//! - Config reload is driven by the file watcher, not by signals

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
