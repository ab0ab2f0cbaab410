//! Logging and metrics for the admin request pipeline.
//!
//! ```text
//! kernel / subscriber / route generator
//!     → tracing events (logging::init_tracing installs the subscriber)
//!     → admin_* counters (metrics::init_metrics exposes them for Prometheus)
//! ```
//!
//! Every request carries an `x-request-id`, recorded on the HTTP span.

pub mod logging;
pub mod metrics;
