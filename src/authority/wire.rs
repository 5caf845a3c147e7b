//! Request/response types for the licensing authority's HTTP API
//!
//! Every response carries a `result` code (0 = ok) and a `message`; payload
//! fields ride alongside. Conversions into domain types live here so the
//! rest of the crate never touches wire shapes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::license::record::{ActivatedMachine, FeatureSet, LicenseRecord};
use crate::quota::NamedCounter;

/// `result` value the authority uses for a successful call.
pub const RESULT_OK: i32 = 0;

// ============================================================================
// Key activation / deactivation
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct ActivateRequest {
    /// Renewal window (seconds) the authority should hold the floating slot
    pub floating_time_interval: u64,
    pub key: String,
    pub machine_code: String,
    pub product_id: u32,
    /// Public key material the caller expects responses to be signed under
    pub public_key: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ActivateResponse {
    #[serde(default)]
    pub license_key: Option<LicenseKeyWire>,
    #[serde(default)]
    pub message: String,
    pub result: i32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeactivateRequest {
    pub floating: bool,
    pub key: String,
    pub machine_code: String,
    pub product_id: u32,
    pub token: String,
}

/// Response carrying no payload beyond the result envelope (deactivate,
/// counter increment/decrement).
#[derive(Debug, Deserialize, Serialize)]
pub struct ResultResponse {
    #[serde(default)]
    pub message: String,
    pub result: i32,
}

/// The license record as the authority serializes it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LicenseKeyWire {
    #[serde(default)]
    pub activated_machines: Vec<ActivatedMachineWire>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    /// String-keyed feature flags ("f1".."f8"; unknown keys are dropped at
    /// the parsing boundary)
    #[serde(default)]
    pub features: HashMap<String, bool>,
    pub key: String,
    #[serde(default)]
    pub max_no_of_machines: Option<u32>,
    pub product_id: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivatedMachineWire {
    pub mid: String,
}

impl From<LicenseKeyWire> for LicenseRecord {
    fn from(wire: LicenseKeyWire) -> Self {
        LicenseRecord {
            expires: wire.expires,
            features: FeatureSet::from_wire(&wire.features),
            key: wire.key,
            machines: wire
                .activated_machines
                .into_iter()
                .map(|m| ActivatedMachine { mid: m.mid })
                .collect(),
            max_machines: wire.max_no_of_machines,
            product_id: wire.product_id,
        }
    }
}

// ============================================================================
// Data objects (remote counters)
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct ListDataObjectsRequest {
    pub key: String,
    /// Substring filter over counter names, scoped to the license key
    pub name_contains: String,
    pub product_id: u32,
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListDataObjectsResponse {
    #[serde(default)]
    pub data_objects: Vec<DataObjectWire>,
    #[serde(default)]
    pub message: String,
    pub result: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataObjectWire {
    pub id: u64,
    pub int_value: i64,
    pub name: String,
}

impl From<DataObjectWire> for NamedCounter {
    fn from(wire: DataObjectWire) -> Self {
        NamedCounter {
            id: wire.id,
            name: wire.name,
            value: wire.int_value,
        }
    }
}

/// Relative delta applied to a counter (increment and decrement share the
/// shape; the path selects the direction).
#[derive(Debug, Deserialize, Serialize)]
pub struct CounterDeltaRequest {
    pub id: u64,
    pub int_value: i64,
    pub key: String,
    pub product_id: u32,
    pub token: String,
}
