//! Dashboard views: URL ↔ route ↔ LAPIS filter mapping.
//!
//! # Data Flow
//! ```text
//! query string
//!     → query.rs (decode, split `field$id` groups)
//!     → codec.rs (per-organism field names)
//!     → view.rs (assemble Route for the page kind)
//!
//! Route
//!     → view.rs to_url (canonical query, defaults omitted)
//!     → view.rs to_lapis_filters (resolved dates, LAPIS keys)
//! ```
//!
//! # Design Decisions
//! - One generic View per (organism, page kind); no per-organism code
//! - Structural errors reject the whole query, never a partial route
//! - Unknown parameters are ignored

pub mod codec;
pub mod query;
pub mod route;
pub mod view;

pub use codec::ParseError;
pub use route::{Route, RouteData, ViewKind};
pub use view::View;
