//! Periodic license validation against the remote authority.
//!
//! One synchronous check runs at startup (fatal on failure, before the
//! listener binds), then a background task re-validates on a fixed interval
//! and swaps the shared [`LicenseState`](super::state::LicenseState). A tick
//! that fires while a validation is still in flight is skipped, so at most
//! one authority call runs at a time.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::authority::AuthorityError;
use crate::AppState;

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error(transparent)]
    Authority(#[from] AuthorityError),
    #[error("Authority returned a license not bound to this machine")]
    MachineMismatch,
}

/// What a single validation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The authority confirmed the license and the state now holds it.
    Validated,
    /// Another validation was still in flight; nothing was done.
    Skipped,
}

/// Run one validation pass.
///
/// Acquires the `validation_in_flight` guard so overlapping passes collapse
/// into one. On any failure the license state is cleared first, so gating
/// fails closed from the moment the problem is known; the caller decides
/// whether the error is fatal.
pub async fn check_once(state: &AppState) -> Result<CheckOutcome, LicenseError> {
    if state
        .validation_in_flight
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        debug!("License validation already in flight, skipping this pass.");
        return Ok(CheckOutcome::Skipped);
    }

    let result = validate_and_store(state).await;

    // Always release the guard
    state.validation_in_flight.store(false, Ordering::SeqCst);

    result.map(|()| CheckOutcome::Validated)
}

/// Inner validation logic (separated so the guard release happens in the
/// caller).
async fn validate_and_store(state: &AppState) -> Result<(), LicenseError> {
    let interval = state.config.license.check_interval_seconds;

    let record = match state.authority.activate(state.machine.as_str(), interval).await {
        Ok(record) => record,
        Err(error) => {
            state.license.clear();
            warn!(error = %error, "License validation failed, features are now blocked");
            return Err(error.into());
        }
    };

    if !record.is_bound_to(&state.machine) {
        state.license.clear();
        warn!(
            machine = %state.machine,
            "Authority accepted the key but lists no activation for this machine"
        );
        return Err(LicenseError::MachineMismatch);
    }

    info!(
        features_enabled = record.features.enabled_count(),
        expires = ?record.expires,
        "License validated"
    );
    state.license.store(record);

    Ok(())
}

/// Start the background re-validation task.
///
/// The returned handle is aborted on shutdown. Failures inside the loop have
/// already cleared the state and logged; the loop keeps ticking so a later
/// pass can restore a valid record.
pub fn spawn(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.license.check_interval_seconds);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // The first tick fires immediately; startup already validated.
        interval.tick().await;

        loop {
            interval.tick().await;
            let _ = check_once(&state).await;
        }
    })
}

/// Release this machine's floating activation slot on the way out.
///
/// Best effort: the process is exiting either way, so failures are logged
/// and swallowed. The local state is cleared first so nothing is served on a
/// released license even if the authority call stalls.
pub async fn deactivate_on_shutdown(state: &AppState) {
    state.license.clear();

    match state.authority.deactivate(state.machine.as_str(), true).await {
        Ok(()) => info!("License activation released"),
        Err(error) => warn!(error = %error, "Failed to release license activation"),
    }
}
