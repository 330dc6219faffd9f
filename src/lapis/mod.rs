//! LAPIS integration.
//!
//! # Data Flow
//! ```text
//! Route
//!     → filter.rs (LapisFilter: resolved dates + metadata keys)
//!     → client.rs (POST {lapis}/sample/aggregated)
//!     → AggregatedRow list
//! ```

pub mod client;
pub mod filter;

pub use client::{AggregatedRow, LapisClient, LapisError, LapisResult};
pub use filter::{GroupFilter, LapisFilter};
