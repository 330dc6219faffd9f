//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Browser URL (path, query)
//!     → router.rs (view lookup by pathname)
//!     → matcher.rs (exact pathname match)
//!     → views::View::parse_url
//!     → Return: Route or None
//!
//! Registry Compilation (at startup and on config reload):
//!     OrganismConfig[]
//!     → one View per configured page kind
//!     → Compile pathname matchers
//!     → Freeze as immutable Registry
//! ```
//!
//! # Design Decisions
//! - Registry compiled from config, immutable at runtime
//! - Deterministic: same URL always yields the same route
//! - Exactly one view per pathname (enforced by config validation)

pub mod matcher;
pub mod router;

pub use router::{resolve_url, Registry};
