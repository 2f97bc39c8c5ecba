//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::resilience::CircuitState;
use crate::domain::storage::OverallStatus;
use crate::domain::MetricsSink;

use super::config::MetricsConfig;

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("resilient_store_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

fn state_value(state: CircuitState) -> f64 {
    match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    }
}

/// Metrics sink forwarding to the installed `metrics` recorder
#[derive(Debug, Default, Clone, Copy)]
pub struct RecorderMetricsSink;

impl MetricsSink for RecorderMetricsSink {
    fn cache_hit(&self, cache: &str) {
        counter!("cache_hits_total", "cache" => cache.to_string()).increment(1);
    }

    fn cache_miss(&self, cache: &str) {
        counter!("cache_misses_total", "cache" => cache.to_string()).increment(1);
    }

    fn cache_eviction(&self, cache: &str) {
        counter!("cache_evictions_total", "cache" => cache.to_string()).increment(1);
    }

    fn cache_expiration(&self, cache: &str) {
        counter!("cache_expirations_total", "cache" => cache.to_string()).increment(1);
    }

    fn breaker_transition(&self, breaker: &str, from: CircuitState, to: CircuitState) {
        let labels = [
            ("breaker", breaker.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
        ];

        counter!("circuit_breaker_transitions_total", &labels).increment(1);
        gauge!("circuit_breaker_state", "breaker" => breaker.to_string()).set(state_value(to));
    }

    fn retry_attempt(&self, operation: &str, attempt: u32, success: bool) {
        let labels = [
            ("operation", operation.to_string()),
            ("status", if success { "success" } else { "error" }.to_string()),
        ];

        counter!("retry_attempts_total", &labels).increment(1);

        if attempt > 1 {
            counter!("retries_total", "operation" => operation.to_string()).increment(1);
        }
    }

    fn backend_latency(&self, backend: &str, latency: Duration, success: bool) {
        let labels = [
            ("backend", backend.to_string()),
            ("status", if success { "success" } else { "error" }.to_string()),
        ];

        histogram!("backend_request_duration_seconds", &labels).record(latency.as_secs_f64());
    }

    fn storage_outcome(&self, status: OverallStatus) {
        counter!("storage_outcomes_total", "status" => status.as_str()).increment(1);
    }
}
