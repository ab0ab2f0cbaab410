//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: admin user, timeout, request ID, trace)
//!     → kernel.rs (route match → RequestAttributes → admin hooks → handler)
//!     → request.rs (attributes and snapshots carried in extensions)
//!     → response.rs (JSON error bodies)
//! ```

pub mod kernel;
pub mod query;
pub mod request;
pub mod response;
pub mod server;

pub use kernel::AdminKernel;
pub use request::{RequestAttributes, RequestSnapshot, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
