//! Infrastructure services

mod dual_write_service;

pub use dual_write_service::{DualWriteConfig, DualWriteCoordinator, DualWriteDeps};
