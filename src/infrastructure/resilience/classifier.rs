//! Error classifier - Maps raw failures to typed kinds

use std::collections::HashSet;
use std::io;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{CoreError, ErrorKind, ProviderError};

static INTEGRITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"duplicate|unique constraint|constraint violation|violates|integrity|already exists").unwrap()
});

static AUTH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"unauthori[sz]ed|forbidden|authentication|invalid api key|permission denied|access denied")
        .unwrap()
});

static QUOTA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"quota|insufficient[_ ]credit|billing|payment required").unwrap());

static RATE_LIMIT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rate[-_ ]?limit|too many requests|throttl").unwrap());

static TIMEOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"timed? ?out|deadline exceeded").unwrap());

static CONNECTIVITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"connection|refused|reset by peer|unreachable|broken pipe|network|unavailable|dns").unwrap()
});

static RETRY_AFTER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)retry[-_ ]?after[:=\s]*(\d+(?:\.\d+)?)\s*(ms|milliseconds?|s|secs?|seconds?)?\b")
        .unwrap()
});

/// Result of classifying one failure
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub retryable: bool,
    /// Delay suggested by the failing side, used instead of computed backoff
    pub retry_after: Option<Duration>,
    pub message: String,
    /// Crate error found in the chain that is re-raised as is
    pub passthrough: Option<CoreError>,
}

impl Classification {
    pub fn into_error(self) -> CoreError {
        if let Some(error) = self.passthrough {
            return error;
        }

        CoreError::Operation {
            kind: self.kind,
            message: self.message,
            retry_after: self.retry_after,
        }
    }
}

/// Pure, total classifier of raw failures
///
/// Typed causes anywhere in the error chain win over message matching. A
/// crate error other than `Operation`, such as `CircuitOpen` raised by a
/// nested executor, is terminal and keeps its variant.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    extra_terminal: HashSet<ErrorKind>,
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an otherwise retryable kind as terminal
    pub fn with_terminal(mut self, kind: ErrorKind) -> Self {
        self.extra_terminal.insert(kind);
        self
    }

    pub fn is_terminal(&self, kind: ErrorKind) -> bool {
        !kind.is_retryable() || self.extra_terminal.contains(&kind)
    }

    pub fn classify(&self, error: &anyhow::Error) -> Classification {
        let message = format!("{:#}", error);

        if let Some(rejection) = passthrough_from_chain(error) {
            return Classification {
                kind: ErrorKind::Unknown,
                retryable: false,
                retry_after: rejection.retry_after(),
                message,
                passthrough: Some(rejection),
            };
        }

        let (kind, hinted_delay) =
            kind_from_chain(error).unwrap_or_else(|| (kind_from_message(&message), None));

        Classification {
            kind,
            retryable: !self.is_terminal(kind),
            retry_after: hinted_delay.or_else(|| parse_retry_after(&message)),
            message,
            passthrough: None,
        }
    }
}

fn passthrough_from_chain(error: &anyhow::Error) -> Option<CoreError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CoreError>())
        .filter(|core| !matches!(core, CoreError::Operation { .. }))
        .cloned()
}

fn kind_from_chain(error: &anyhow::Error) -> Option<(ErrorKind, Option<Duration>)> {
    for cause in error.chain() {
        if let Some(CoreError::Operation {
            kind, retry_after, ..
        }) = cause.downcast_ref::<CoreError>()
        {
            return Some((*kind, *retry_after));
        }

        if let Some(provider) = cause.downcast_ref::<ProviderError>() {
            let kind = provider
                .status
                .and_then(kind_from_status)
                .unwrap_or_else(|| kind_from_message(&provider.message));
            return Some((kind, provider.retry_after));
        }

        if cause.is::<tokio::time::error::Elapsed>() {
            return Some((ErrorKind::Timeout, None));
        }

        if let Some(kind) = cause
            .downcast_ref::<io::Error>()
            .and_then(|io_error| kind_from_io(io_error.kind()))
        {
            return Some((kind, None));
        }
    }

    None
}

/// Maps an HTTP-like status to a kind
pub fn kind_from_status(status: u16) -> Option<ErrorKind> {
    match status {
        429 => Some(ErrorKind::RateLimited),
        401 | 403 => Some(ErrorKind::AuthFailure),
        402 => Some(ErrorKind::QuotaExceeded),
        409 | 422 => Some(ErrorKind::IntegrityViolation),
        408 | 504 => Some(ErrorKind::Timeout),
        500..=599 => Some(ErrorKind::Connectivity),
        _ => None,
    }
}

fn kind_from_io(kind: io::ErrorKind) -> Option<ErrorKind> {
    match kind {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => Some(ErrorKind::Connectivity),
        io::ErrorKind::TimedOut => Some(ErrorKind::Timeout),
        io::ErrorKind::PermissionDenied => Some(ErrorKind::AuthFailure),
        io::ErrorKind::AlreadyExists => Some(ErrorKind::IntegrityViolation),
        _ => None,
    }
}

fn kind_from_message(message: &str) -> ErrorKind {
    let message = message.to_lowercase();

    if INTEGRITY_PATTERN.is_match(&message) {
        ErrorKind::IntegrityViolation
    } else if AUTH_PATTERN.is_match(&message) {
        ErrorKind::AuthFailure
    } else if QUOTA_PATTERN.is_match(&message) {
        ErrorKind::QuotaExceeded
    } else if RATE_LIMIT_PATTERN.is_match(&message) {
        ErrorKind::RateLimited
    } else if TIMEOUT_PATTERN.is_match(&message) {
        ErrorKind::Timeout
    } else if CONNECTIVITY_PATTERN.is_match(&message) {
        ErrorKind::Connectivity
    } else {
        ErrorKind::Unknown
    }
}

/// Extracts a "retry after N" hint, seconds unless suffixed with `ms`
pub fn parse_retry_after(message: &str) -> Option<Duration> {
    let captures = RETRY_AFTER_PATTERN.captures(message)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let millis = captures
        .get(2)
        .is_some_and(|unit| unit.as_str().to_lowercase().starts_with("m"));

    let seconds = if millis { value / 1000.0 } else { value };
    Duration::try_from_secs_f64(seconds).ok()
}
