//! Scripted failure injection for in-memory backends

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use anyhow::anyhow;
use parking_lot::Mutex;

use crate::domain::{ErrorKind, ProviderError};

/// Builds the raw error a real driver would raise for a failure kind
pub fn raw_error(backend: &str, kind: ErrorKind) -> anyhow::Error {
    match kind {
        ErrorKind::Connectivity => {
            io::Error::new(io::ErrorKind::ConnectionRefused, format!("{}: connection refused", backend))
                .into()
        }
        ErrorKind::Timeout => {
            io::Error::new(io::ErrorKind::TimedOut, format!("{}: operation timed out", backend)).into()
        }
        ErrorKind::RateLimited => ProviderError::new(backend, "too many requests")
            .with_status(429)
            .with_retry_after(Duration::from_secs(1))
            .into(),
        ErrorKind::IntegrityViolation => {
            anyhow!("{}: duplicate key value violates unique constraint", backend)
        }
        ErrorKind::AuthFailure => ProviderError::new(backend, "invalid credentials")
            .with_status(401)
            .into(),
        ErrorKind::QuotaExceeded => ProviderError::new(backend, "storage quota exceeded")
            .with_status(402)
            .into(),
        ErrorKind::Unknown => anyhow!("{}: unexpected backend failure", backend),
    }
}

/// Failure schedule consulted once per backend call
#[derive(Debug, Default)]
pub struct FailureInjector {
    scripted: Mutex<VecDeque<ErrorKind>>,
    persistent: Mutex<Option<ErrorKind>>,
}

impl FailureInjector {
    /// Fails the next `count` calls with `kind`, after any already scripted
    pub fn fail_next(&self, count: u32, kind: ErrorKind) {
        let mut scripted = self.scripted.lock();
        scripted.extend(std::iter::repeat_n(kind, count as usize));
    }

    /// Fails every call once the script is drained
    pub fn fail_always(&self, kind: ErrorKind) {
        *self.persistent.lock() = Some(kind);
    }

    pub fn heal(&self) {
        self.scripted.lock().clear();
        *self.persistent.lock() = None;
    }

    pub fn next_failure(&self, backend: &str) -> Option<anyhow::Error> {
        let kind = self
            .scripted
            .lock()
            .pop_front()
            .or_else(|| *self.persistent.lock())?;

        Some(raw_error(backend, kind))
    }
}
