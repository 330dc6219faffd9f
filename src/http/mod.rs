//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, registry hot swap)
//!     → request.rs (request ID)
//!     → handlers.rs (resolve dashboard URL → route / LAPIS filters / counts)
//!     → JSON response
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
