//! Shared holder for the current validated license.
//!
//! One writer (the periodic validator) races many readers (request
//! handlers). Replacement swaps an `Arc` pointer under a write lock held
//! only for the swap, so a reader sees either the old record or the new one
//! in full, never a mix. Reads clone the `Arc` out and release the lock
//! immediately; no lock is ever held across an await point, and gate checks
//! therefore never suspend.

use std::sync::{Arc, PoisonError, RwLock};

use super::record::LicenseRecord;

/// Process-wide license cell: `Absent` until the first successful
/// validation, then `Valid` holding the most recent record.
#[derive(Debug, Default)]
pub struct LicenseState {
    record: RwLock<Option<Arc<LicenseRecord>>>,
}

impl LicenseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current record, if any.
    pub fn get(&self) -> Option<Arc<LicenseRecord>> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the held record with a freshly validated one.
    pub fn store(&self, record: LicenseRecord) {
        *self
            .record
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(record));
    }

    /// Drop to `Absent`. All gating fails closed until the next `store`.
    pub fn clear(&self) {
        *self
            .record
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_valid(&self) -> bool {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
