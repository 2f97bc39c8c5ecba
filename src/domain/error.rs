use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified kind of an operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Timeout,
    RateLimited,
    IntegrityViolation,
    AuthFailure,
    QuotaExceeded,
    Unknown,
}

impl ErrorKind {
    /// Integrity, auth and quota failures never succeed on a retry
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::IntegrityViolation | Self::AuthFailure | Self::QuotaExceeded
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connectivity => "connectivity",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::IntegrityViolation => "integrity_violation",
            Self::AuthFailure => "auth_failure",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Operation failed ({kind}): {message}")]
    Operation {
        kind: ErrorKind,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Circuit breaker '{name}' is open, retry after {}s", .retry_after.as_secs())]
    CircuitOpen { name: String, retry_after: Duration },

    #[error("Concurrency limit of {limit} exceeded for '{class}'")]
    ConcurrencyLimitExceeded { class: String, limit: usize },

    #[error("All storage backends failed (primary: {primary}; secondary: {secondary})")]
    AggregatedStorageFailure {
        primary: Box<CoreError>,
        secondary: Box<CoreError>,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn operation(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Operation {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::Operation {
            kind: ErrorKind::RateLimited,
            message: message.into(),
            retry_after,
        }
    }

    pub fn circuit_open(name: impl Into<String>, retry_after: Duration) -> Self {
        Self::CircuitOpen {
            name: name.into(),
            retry_after,
        }
    }

    pub fn concurrency_limit(class: impl Into<String>, limit: usize) -> Self {
        Self::ConcurrencyLimitExceeded {
            class: class.into(),
            limit,
        }
    }

    pub fn aggregated(primary: CoreError, secondary: CoreError) -> Self {
        Self::AggregatedStorageFailure {
            primary: Box::new(primary),
            secondary: Box::new(secondary),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Classified kind, present only for operation failures
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Operation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Circuit-open and backpressure rejections are terminal for the call that saw them
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some_and(|kind| kind.is_retryable())
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::Operation { kind, .. } => kind.as_str(),
            Self::CircuitOpen { .. } => "circuit_open",
            Self::ConcurrencyLimitExceeded { .. } => "concurrency_limit_exceeded",
            Self::AggregatedStorageFailure { .. } => "aggregated_storage_failure",
            Self::NotFound { .. } => "not_found",
            Self::Serialization { .. } => "serialization_error",
        }
    }

    /// HTTP-style status a request layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::CircuitOpen { .. } | Self::ConcurrencyLimitExceeded { .. } => 503,
            Self::Operation {
                kind: ErrorKind::RateLimited,
                ..
            } => 503,
            _ => 500,
        }
    }

    /// Retry hint for the caller, if one is known
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::CircuitOpen { retry_after, .. } => Some(*retry_after),
            Self::Operation { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Raw failure raised by an external provider or driver that speaks in status codes
#[derive(Debug, Clone, Error)]
#[error("{provider} error: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub status: Option<u16>,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_kinds_are_not_retryable() {
        assert!(!ErrorKind::IntegrityViolation.is_retryable());
        assert!(!ErrorKind::AuthFailure.is_retryable());
        assert!(!ErrorKind::QuotaExceeded.is_retryable());
        assert!(ErrorKind::Connectivity.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::Unknown.is_retryable());
    }

    #[test]
    fn test_circuit_open_maps_to_service_unavailable() {
        let error = CoreError::circuit_open("storage:primary", Duration::from_secs(60));

        assert_eq!(error.status_code(), 503);
        assert_eq!(error.code(), "circuit_open");
        assert_eq!(error.retry_after(), Some(Duration::from_secs(60)));
        assert!(!error.is_retryable());
        assert_eq!(
            error.to_string(),
            "Circuit breaker 'storage:primary' is open, retry after 60s"
        );
    }

    #[test]
    fn test_aggregated_failure_carries_both_errors() {
        let error = CoreError::aggregated(
            CoreError::operation(ErrorKind::Connectivity, "refused"),
            CoreError::operation(ErrorKind::Timeout, "deadline"),
        );

        assert_eq!(error.status_code(), 500);
        assert_eq!(error.code(), "aggregated_storage_failure");

        match &error {
            CoreError::AggregatedStorageFailure { primary, secondary } => {
                assert_eq!(primary.kind(), Some(ErrorKind::Connectivity));
                assert_eq!(secondary.kind(), Some(ErrorKind::Timeout));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_operation_error_display() {
        let error = CoreError::operation(ErrorKind::AuthFailure, "bad credentials");
        assert_eq!(
            error.to_string(),
            "Operation failed (auth_failure): bad credentials"
        );
    }

    #[test]
    fn test_configuration_error() {
        let error = CoreError::configuration("max_size must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Configuration error: max_size must be greater than zero"
        );
        assert_eq!(error.status_code(), 400);
    }
}
