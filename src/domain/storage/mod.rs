//! Storage domain - items, outcomes and backend contracts

mod backend;
mod fingerprint;
mod item;
mod outcome;

pub use backend::{PrimaryBackend, SecondaryBackend};
pub use fingerprint::{normalize_content, Fingerprinter, DEFAULT_DISCRIMINATING_KEYS};
pub use item::{ItemChanges, StorableItem, VersionHistoryEntry, DEFAULT_VERSION_HISTORY_LIMIT};
pub use outcome::{BackendOutcome, OverallStatus, StorageOutcome};
