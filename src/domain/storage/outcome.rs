//! Dual-write outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate status across all backends of one write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    FullSuccess,
    PartialSuccess,
    TotalFailure,
}

impl OverallStatus {
    /// FullSuccess iff every backend succeeded, TotalFailure iff every backend failed
    pub fn from_results(successes: &[bool]) -> Self {
        if successes.iter().all(|ok| *ok) {
            Self::FullSuccess
        } else if successes.iter().any(|ok| *ok) {
            Self::PartialSuccess
        } else {
            Self::TotalFailure
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullSuccess => "full_success",
            Self::PartialSuccess => "partial_success",
            Self::TotalFailure => "total_failure",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of writing to a single backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendOutcome {
    pub backend: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable error code of the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub latency_ms: u64,
}

/// Structured result of a dual write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageOutcome {
    pub item_id: String,
    pub fingerprint: String,
    pub status: OverallStatus,
    pub backends: Vec<BackendOutcome>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl StorageOutcome {
    pub fn backend(&self, name: &str) -> Option<&BackendOutcome> {
        self.backends.iter().find(|b| b.backend == name)
    }

    pub fn failed_backends(&self) -> impl Iterator<Item = &BackendOutcome> {
        self.backends.iter().filter(|b| !b.success)
    }
}
