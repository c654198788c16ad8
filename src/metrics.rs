//! Request and storage latency metrics, exported in Prometheus text format

use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics for the payload endpoints, registered on a private registry
#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    /// Requests received, per endpoint
    pub requests_total: IntCounterVec,
    /// Time spent waiting on storage, per endpoint
    pub db_duration_seconds: HistogramVec,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "payload_tracker_api_requests_total",
                "Total requests received by the payload endpoints",
            ),
            &["endpoint"],
        )?;

        let db_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "payload_tracker_api_db_seconds",
                "Storage query latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(db_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            db_duration_seconds,
        })
    }

    pub fn inc_requests(&self, endpoint: &str) {
        self.requests_total.with_label_values(&[endpoint]).inc();
    }

    pub fn observe_db_time(&self, endpoint: &str, elapsed: Duration) {
        self.db_duration_seconds
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    pub fn requests(&self, endpoint: &str) -> u64 {
        self.requests_total.with_label_values(&[endpoint]).get()
    }

    /// Everything registered, in the text exposition format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
