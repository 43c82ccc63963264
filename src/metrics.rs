//! Prometheus metrics for request and upstream tracking.
//!
//! This module provides metrics for:
//! - Proxied requests by route and status
//! - Upstream call latency
//! - Upstream failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Proxied requests counter metric name.
pub const METRIC_REQUESTS: &str = "proxy_requests_total";
/// Upstream call latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";

/// Register metric descriptions with the installed recorder.
/// Descriptions sent before a recorder is installed are lost.
pub fn init_metrics() {
    describe_counter!(
        METRIC_REQUESTS,
        "Total number of proxied requests by route and response status"
    );
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Assistant API call latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_FAILURES,
        "Total number of failed or non-2xx assistant API calls"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter on its own listener, then describe metrics.
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    init_metrics();
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record one finished request.
pub fn inc_requests(route: &str, status: u16) {
    counter!(METRIC_REQUESTS, "route" => route.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record upstream call latency.
pub fn record_upstream_latency(start: Instant, route: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY, "route" => route.to_string()).record(latency_ms);
}

/// Increment upstream failures counter.
pub fn inc_upstream_failures(route: &str) {
    counter!(METRIC_UPSTREAM_FAILURES, "route" => route.to_string()).increment(1);
}
