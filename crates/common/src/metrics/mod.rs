//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions for the
//! review engine.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Peerflow metrics
pub const METRICS_PREFIX: &str = "peerflow";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.075, 0.100, 0.150, 0.250, 0.500, 1.000, 2.500,
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_assignments_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total review assignments created"
    );

    describe_counter!(
        format!("{}_assignments_skipped_total", METRICS_PREFIX),
        Unit::Count,
        "Assignments skipped because the pair was already assigned"
    );

    describe_histogram!(
        format!("{}_ranking_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Reviewer ranking latency in seconds"
    );

    describe_counter!(
        format!("{}_reviews_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total reviews submitted, labelled by kind and disposition"
    );

    describe_counter!(
        format!("{}_notifications_total", METRICS_PREFIX),
        Unit::Count,
        "Notification dispatch attempts, labelled by kind and outcome"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record the outcome of one assignment batch
pub fn record_assignment_batch(created: usize, skipped: usize, ranking_secs: f64) {
    counter!(format!("{}_assignments_created_total", METRICS_PREFIX)).increment(created as u64);
    counter!(format!("{}_assignments_skipped_total", METRICS_PREFIX)).increment(skipped as u64);
    histogram!(format!("{}_ranking_duration_seconds", METRICS_PREFIX)).record(ranking_secs);
}

/// Record a submitted review
pub fn record_review(kind: &str, disposition: &str) {
    counter!(
        format!("{}_reviews_submitted_total", METRICS_PREFIX),
        "kind" => kind.to_string(),
        "disposition" => disposition.to_string()
    )
    .increment(1);
}

/// Record a notification dispatch attempt
pub fn record_notification(kind: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };

    counter!(
        format!("{}_notifications_total", METRICS_PREFIX),
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("POST", "/v1/submissions/:id/reviews");
        std::thread::sleep(std::time::Duration::from_millis(1));
        metrics.finish(201);
        // Just verify it runs without panic
    }
}
