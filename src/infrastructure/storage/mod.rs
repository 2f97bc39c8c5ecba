//! Storage infrastructure - Backend implementations

mod failure;
mod in_memory;

pub use failure::{raw_error, FailureInjector};
pub use in_memory::{InMemoryPrimaryBackend, InMemorySecondaryBackend};
