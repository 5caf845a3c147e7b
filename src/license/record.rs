//! The validated license record and its closed feature set.
//!
//! The authority reports feature flags as string-keyed booleans. They are
//! folded into a [`FeatureSet`] once, at the response-parsing boundary, so
//! unknown keys are handled in exactly one place and every later gate check
//! is an infallible in-memory read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::identity::MachineIdentity;

/// Activated machine codes holding a floating slot carry this prefix in the
/// authority's machine list.
const FLOATING_PREFIX: &str = "floating:";

/// The closed set of gateable features, mapped to the authority's flag keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Feature1,
    Feature2,
    Feature3,
    Feature4,
    Feature5,
    Feature6,
    Feature7,
    Feature8,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Feature1,
        Feature::Feature2,
        Feature::Feature3,
        Feature::Feature4,
        Feature::Feature5,
        Feature::Feature6,
        Feature::Feature7,
        Feature::Feature8,
    ];

    /// The flag key used on the wire ("f1".."f8").
    pub fn key(self) -> &'static str {
        match self {
            Feature::Feature1 => "f1",
            Feature::Feature2 => "f2",
            Feature::Feature3 => "f3",
            Feature::Feature4 => "f4",
            Feature::Feature5 => "f5",
            Feature::Feature6 => "f6",
            Feature::Feature7 => "f7",
            Feature::Feature8 => "f8",
        }
    }

    /// Resolve a wire flag key back to a feature, if it names one.
    pub fn from_key(key: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.key() == key)
    }

    fn index(self) -> usize {
        match self {
            Feature::Feature1 => 0,
            Feature::Feature2 => 1,
            Feature::Feature3 => 2,
            Feature::Feature4 => 3,
            Feature::Feature5 => 4,
            Feature::Feature6 => 5,
            Feature::Feature7 => 6,
            Feature::Feature8 => 7,
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Closed-enum -> bool mapping built once from the wire's flag map.
///
/// A flag that was absent on the wire is disabled; so is any feature after
/// `Default` construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: [bool; Feature::ALL.len()],
}

impl FeatureSet {
    /// Fold the authority's string-keyed flags into the closed set.
    ///
    /// Keys that do not name a known feature are dropped here, once, rather
    /// than surfacing per access.
    pub fn from_wire(flags: &HashMap<String, bool>) -> Self {
        let mut set = FeatureSet::default();
        for (key, value) in flags {
            match Feature::from_key(key) {
                Some(feature) => set.enabled[feature.index()] = *value,
                None => {
                    tracing::debug!(key = %key, "Ignoring unknown feature flag from authority");
                }
            }
        }
        set
    }

    pub fn enabled(&self, feature: Feature) -> bool {
        self.enabled[feature.index()]
    }

    /// Count of enabled features, for startup/refresh logging.
    pub fn enabled_count(&self) -> usize {
        self.enabled.iter().filter(|&&on| on).count()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        let mut set = FeatureSet::default();
        for feature in features {
            set.enabled[feature.index()] = true;
        }
        set
    }
}

/// A machine code the authority currently lists as activated for the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedMachine {
    pub mid: String,
}

/// The validated license as returned by the authority.
///
/// A record held in [`super::state::LicenseState`] was confirmed valid for
/// this machine at the time it was fetched. It carries no local expiry
/// enforcement; staleness is bounded only by the re-validation interval.
#[derive(Debug, Clone)]
pub struct LicenseRecord {
    /// Expiry metadata as reported by the authority (not locally enforced)
    pub expires: Option<DateTime<Utc>>,
    pub features: FeatureSet,
    /// License key string; addresses remote counters scoped to this license
    pub key: String,
    /// Machine codes the authority lists as holding activation slots
    pub machines: Vec<ActivatedMachine>,
    pub max_machines: Option<u32>,
    pub product_id: u32,
}

impl LicenseRecord {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.enabled(feature)
    }

    /// Whether this record is bound to the given machine under floating
    /// semantics: the authority's machine list contains either the bare code
    /// or the `floating:`-prefixed slot entry for it.
    pub fn is_bound_to(&self, machine: &MachineIdentity) -> bool {
        self.machines.iter().any(|m| {
            m.mid == machine.as_str()
                || m.mid
                    .strip_prefix(FLOATING_PREFIX)
                    .is_some_and(|code| code == machine.as_str())
        })
    }
}
