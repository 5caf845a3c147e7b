//! Usage and quota accounting against remote named counters.
//!
//! Counters live on the authority and are shared by every instance running
//! under the same license key. Local code only issues relative deltas —
//! increment-only usage metering and decrement-only quota consumption — and
//! re-resolves a counter by name before every mutation.

mod accessor;

pub use accessor::{decrement, increment, is_quota_available, lookup};

use thiserror::Error;

use crate::authority::AuthorityError;

/// The closed set of counter names provisioned on the license.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterName {
    /// Usage meter provisioned for feature 1 (no endpoint currently wired)
    Feat1UsageCount,
    /// Up-front quota consumed by the feature-mix quota endpoint
    MixFeatQuotaCount,
    /// Usage meter behind the feature-mix usage endpoint
    MixFeatUsageCount,
}

impl CounterName {
    pub fn as_str(self) -> &'static str {
        match self {
            CounterName::Feat1UsageCount => "feat1_usage_count",
            CounterName::MixFeatQuotaCount => "feat_mix_quota_count",
            CounterName::MixFeatUsageCount => "feat_mix_usage_count",
        }
    }
}

impl std::fmt::Display for CounterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A remote integer counter addressed by name.
///
/// The value is authority-owned and may be concurrently modified by other
/// instances; it is a snapshot, not a lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCounter {
    /// Remote identifier, valid only for the call that resolved it
    pub id: u64,
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Authority error: {0}")]
    Authority(#[from] AuthorityError),
    #[error("No remote counter matches `{0}`; the license data is misprovisioned")]
    CounterMissing(CounterName),
}
