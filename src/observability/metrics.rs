//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admin_requests_total` (counter): requests by outcome (`admin`, `app`, `not_found`, `error`)
//! - `admin_route_cache_regenerations_total` (counter): cold route caches repaired at request time
//! - `admin_delegated_requests_total` (counter): requests delegated to an application route
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition runs on its own listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const REQUESTS_TOTAL: &str = "admin_requests_total";
pub const ROUTE_CACHE_REGENERATIONS_TOTAL: &str = "admin_route_cache_regenerations_total";
pub const DELEGATED_REQUESTS_TOTAL: &str = "admin_delegated_requests_total";

/// Installs the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_route_cache_regeneration() {
    metrics::counter!(ROUTE_CACHE_REGENERATIONS_TOTAL).increment(1);
}

pub fn record_delegated_request(route: &str) {
    metrics::counter!(DELEGATED_REQUESTS_TOTAL, "route" => route.to_string()).increment(1);
}
