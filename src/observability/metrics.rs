//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count route parses per organism, view and outcome
//! - Time outbound LAPIS requests
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `dashboard_route_parse_total` (counter): parses by organism, view, outcome
//! - `dashboard_lapis_requests_total` (counter): LAPIS calls by organism, status
//! - `dashboard_lapis_request_duration_seconds` (histogram): LAPIS latency
//!
//! # Design Decisions
//! - Status `0` labels requests that never got a response
//! - Labels stay low-cardinality: no URLs, no filter values

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::views::ViewKind;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_route_parse(organism: &str, view: ViewKind, outcome: &'static str) {
    metrics::counter!(
        "dashboard_route_parse_total",
        "organism" => organism.to_string(),
        "view" => view.slug(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_lapis_request(organism: &str, status: u16, start: Instant) {
    metrics::counter!(
        "dashboard_lapis_requests_total",
        "organism" => organism.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "dashboard_lapis_request_duration_seconds",
        "organism" => organism.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
