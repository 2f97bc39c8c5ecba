//! Collaborator traits consumed by the core

mod clock;
mod metrics;

pub use clock::Clock;
pub use metrics::{MetricsSink, NoopMetricsSink};

#[cfg(test)]
pub use metrics::MockMetricsSink;
