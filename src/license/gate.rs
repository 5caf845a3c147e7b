//! Fail-closed feature gating over the shared license state.

use tracing::warn;

use super::record::Feature;
use super::state::LicenseState;

/// Whether a feature is enabled on the current license.
///
/// Absent license state and flags missing from the record both gate to
/// `false`; a gate check is never an error. Pure in-memory read.
pub fn is_enabled(state: &LicenseState, feature: Feature) -> bool {
    match state.get() {
        Some(record) => record.is_enabled(feature),
        None => {
            warn!(feature = %feature, "License state is absent; failing closed");
            false
        }
    }
}

/// Whether any of the given features is enabled. Reads the state once, so
/// an absent license produces a single diagnostic rather than one per flag.
pub fn any_enabled(state: &LicenseState, features: &[Feature]) -> bool {
    match state.get() {
        Some(record) => features.iter().any(|&f| record.is_enabled(f)),
        None => {
            warn!("License state is absent; failing closed");
            false
        }
    }
}
