//! Route and filter encoding for a genomic surveillance dashboard.
//!
//! Dashboard URLs carry the whole page state in their query string. This
//! crate parses them into typed routes, writes routes back to canonical
//! URLs and turns them into LAPIS sample filters.

pub mod config;
pub mod filters;
pub mod http;
pub mod lapis;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod views;

pub use config::schema::DashboardConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Registry;
pub use views::{Route, RouteData, View, ViewKind};
