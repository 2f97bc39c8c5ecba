//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{init_metrics, PrometheusMetrics, RecorderMetricsSink};
