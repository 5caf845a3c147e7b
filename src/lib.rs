//! license-gate - A license-gated feature-flag service
//!
//! This crate serves HTTP endpoints whose availability is governed by a
//! remotely validated software license:
//! - Floating license activation bound to a per-process machine code
//! - Periodic re-validation with fail-closed gating in between
//! - Closed-enum feature flags parsed once at the wire boundary
//! - Remote usage metering and up-front quota consumption counters
//! - REST API

pub mod api;
pub mod authority;
pub mod config;
pub mod license;
pub mod quota;

use std::sync::atomic::AtomicBool;

use authority::AuthorityClient;
use config::Config;
use license::{LicenseState, MachineIdentity};

/// Shared application state
pub struct AppState {
    pub authority: AuthorityClient,
    pub config: Config,
    pub license: LicenseState,
    pub machine: MachineIdentity,
    /// Guard keeping at most one license validation in flight
    pub validation_in_flight: AtomicBool,
}
