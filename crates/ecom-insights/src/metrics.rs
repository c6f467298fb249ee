use axum::http::StatusCode;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Registry, TextEncoder};
use std::sync::OnceLock;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static UPSTREAM_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Registers the server's collectors. Safe to call more than once.
pub fn init_metrics() -> prometheus::Result<()> {
    if REQ_COUNTER.get().is_none() {
        let counter = IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"],
        )?;
        REGISTRY.register(Box::new(counter.clone())).ok();
        let _ = REQ_COUNTER.set(counter);
    }

    if UPSTREAM_LATENCY.get().is_none() {
        let histogram = Histogram::with_opts(HistogramOpts::new(
            "upstream_request_seconds",
            "Latency of completion API calls",
        ))?;
        REGISTRY.register(Box::new(histogram.clone())).ok();
        let _ = UPSTREAM_LATENCY.set(histogram);
    }

    Ok(())
}

pub fn inc_request(route: &str, status: StatusCode) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status.as_str()]).inc();
    }
}

pub fn observe_upstream(seconds: f64) {
    if let Some(histogram) = UPSTREAM_LATENCY.get() {
        histogram.observe(seconds);
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, Vec::new()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_and_counts_requests() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        inc_request("/users", StatusCode::OK);
        inc_request("/users", StatusCode::OK);

        let counter = REQ_COUNTER.get().unwrap();
        assert!(counter.with_label_values(&["/users", "200"]).get() >= 2);
    }
}
