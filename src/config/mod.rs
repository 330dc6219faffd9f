//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DashboardConfig (validated, immutable)
//!     → routing::Registry compiled from organisms
//!
//! On file change:
//!     watcher.rs sees new content (directory watch, same content skipped)
//!     → loader.rs parses new config
//!     → validation.rs validates
//!     → server swaps in a new Arc<Registry>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All sections have defaults; organisms default to the built-in list
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::DashboardConfig;
pub use schema::ObservabilityConfig;
pub use schema::OrganismConfig;
pub use schema::ServerConfig;
