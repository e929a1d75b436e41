use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: backend requests issued. Labels: op, status.
pub const BACKEND_REQUESTS_TOTAL: &str = "bookdesk_backend_requests_total";

/// Histogram: backend request latency in seconds. Labels: op.
pub const BACKEND_REQUEST_DURATION_SECONDS: &str = "bookdesk_backend_request_duration_seconds";

/// Counter: local queries evaluated against the cache.
pub const QUERIES_TOTAL: &str = "bookdesk_queries_total";

/// Counter: list responses carrying fewer bookings than the backend's reported total.
pub const LIST_TRUNCATED_TOTAL: &str = "bookdesk_list_truncated_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: bookings held in the cache.
pub const CACHE_BOOKINGS: &str = "bookdesk_cache_bookings";

/// Gauge: mutations currently in flight.
pub const MUTATIONS_IN_FLIGHT: &str = "bookdesk_mutations_in_flight";

/// Counter: mutation results dropped because a newer load replaced the cache.
pub const STALE_RESULTS_DISCARDED_TOTAL: &str = "bookdesk_stale_results_discarded_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Record one backend round trip.
pub fn record_request(op: &'static str, ok: bool, started: std::time::Instant) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(BACKEND_REQUESTS_TOTAL, "op" => op, "status" => status).increment(1);
    metrics::histogram!(BACKEND_REQUEST_DURATION_SECONDS, "op" => op)
        .record(started.elapsed().as_secs_f64());
}
