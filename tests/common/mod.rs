//! Shared integration-test fixtures: an in-process fake licensing authority
//! plus helpers to wire an application instance against it.
//!
//! The fake speaks the authority's wire protocol over real HTTP on an
//! ephemeral loopback port, so tests exercise the full client path. Its
//! behavior is scripted per test through shared handles.

// Each test binary compiles this module separately and uses its own subset
// of the helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use license_gate::authority::wire::{
    ActivateRequest, ActivateResponse, ActivatedMachineWire, CounterDeltaRequest, DataObjectWire,
    DeactivateRequest, LicenseKeyWire, ListDataObjectsRequest, ListDataObjectsResponse,
    ResultResponse, RESULT_OK,
};
use license_gate::authority::{AuthorityClient, Credentials};
use license_gate::config::{AuthorityConfig, Config, LicenseConfig, ServerConfig};
use license_gate::license::{LicenseState, MachineIdentity};
use license_gate::AppState;

pub const PRODUCT_ID: u32 = 4321;
pub const PRODUCT_KEY: &str = "TEST0-KEY00-00000-00000";

// ============================================================================
// Fake authority
// ============================================================================

/// Scripted behavior and call counters for the fake authority.
///
/// Tests hold an `Arc` to this and mutate it between requests; the handlers
/// below read it per call.
#[derive(Debug, Default)]
pub struct FakeAuthority {
    pub activate_calls: AtomicUsize,
    /// Artificial delay before answering an activation, for overlap tests
    pub activate_delay: Mutex<Duration>,
    /// Machine codes reported as activated; empty echoes the caller's code
    /// back as a floating slot
    pub bound_machines: Mutex<Vec<String>>,
    pub counters: Mutex<HashMap<String, FakeCounter>>,
    /// When set, counter calls answer with a non-zero result code
    pub data_fails: AtomicBool,
    pub deactivate_calls: AtomicUsize,
    /// When set, deactivations answer with a non-zero result code
    pub deactivate_fails: AtomicBool,
    /// Feature flags served on the license record
    pub features: Mutex<HashMap<String, bool>>,
    /// When cleared, activations answer with a non-zero result code
    pub valid: AtomicBool,
}

#[derive(Debug, Clone, Copy)]
pub struct FakeCounter {
    pub id: u64,
    pub value: i64,
}

impl FakeAuthority {
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        fake.valid.store(true, Ordering::SeqCst);
        Arc::new(fake)
    }

    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
    }

    pub fn set_features(&self, flags: &[(&str, bool)]) {
        let mut features = self.features.lock().unwrap();
        features.clear();
        for (key, value) in flags {
            features.insert(key.to_string(), *value);
        }
    }

    pub fn set_bound_machines(&self, codes: &[&str]) {
        *self.bound_machines.lock().unwrap() =
            codes.iter().map(|code| code.to_string()).collect();
    }

    pub fn set_counter(&self, name: &str, id: u64, value: i64) {
        self.counters
            .lock()
            .unwrap()
            .insert(name.to_string(), FakeCounter { id, value });
    }

    pub fn counter_value(&self, name: &str) -> i64 {
        self.counters.lock().unwrap()[name].value
    }

    pub fn set_activate_delay(&self, delay: Duration) {
        *self.activate_delay.lock().unwrap() = delay;
    }

    pub fn set_data_fails(&self, fails: bool) {
        self.data_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_deactivate_fails(&self, fails: bool) {
        self.deactivate_fails.store(fails, Ordering::SeqCst);
    }

    pub fn activations(&self) -> usize {
        self.activate_calls.load(Ordering::SeqCst)
    }

    pub fn deactivations(&self) -> usize {
        self.deactivate_calls.load(Ordering::SeqCst)
    }
}

/// Serve the fake authority on an ephemeral loopback port; returns its base
/// URL.
pub async fn spawn_fake_authority(fake: Arc<FakeAuthority>) -> String {
    let app = Router::new()
        .route("/api/key/activate", post(activate))
        .route("/api/key/deactivate", post(deactivate))
        .route("/api/data/list", post(list_data_objects))
        .route("/api/data/increment", post(increment))
        .route("/api/data/decrement", post(decrement))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn activate(
    State(fake): State<Arc<FakeAuthority>>,
    Json(req): Json<ActivateRequest>,
) -> Json<ActivateResponse> {
    fake.activate_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *fake.activate_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if !fake.valid.load(Ordering::SeqCst) {
        return Json(ActivateResponse {
            license_key: None,
            message: "Unable to activate the key".to_string(),
            result: 1,
        });
    }

    let bound = fake.bound_machines.lock().unwrap().clone();
    let machines = if bound.is_empty() {
        vec![format!("floating:{}", req.machine_code)]
    } else {
        bound
    };

    Json(ActivateResponse {
        license_key: Some(LicenseKeyWire {
            activated_machines: machines
                .into_iter()
                .map(|mid| ActivatedMachineWire { mid })
                .collect(),
            expires: None,
            features: fake.features.lock().unwrap().clone(),
            key: req.key,
            max_no_of_machines: Some(10),
            product_id: req.product_id,
        }),
        message: String::new(),
        result: RESULT_OK,
    })
}

async fn deactivate(
    State(fake): State<Arc<FakeAuthority>>,
    Json(_req): Json<DeactivateRequest>,
) -> Json<ResultResponse> {
    fake.deactivate_calls.fetch_add(1, Ordering::SeqCst);

    if fake.deactivate_fails.load(Ordering::SeqCst) {
        return Json(ResultResponse {
            message: "machine code was not activated".to_string(),
            result: 1,
        });
    }

    Json(ResultResponse {
        message: String::new(),
        result: RESULT_OK,
    })
}

async fn list_data_objects(
    State(fake): State<Arc<FakeAuthority>>,
    Json(req): Json<ListDataObjectsRequest>,
) -> Json<ListDataObjectsResponse> {
    if fake.data_fails.load(Ordering::SeqCst) {
        return Json(ListDataObjectsResponse {
            data_objects: vec![],
            message: "server error".to_string(),
            result: 1,
        });
    }

    let counters = fake.counters.lock().unwrap();
    let data_objects = counters
        .iter()
        .filter(|(name, _)| name.contains(&req.name_contains))
        .map(|(name, counter)| DataObjectWire {
            id: counter.id,
            int_value: counter.value,
            name: name.clone(),
        })
        .collect();

    Json(ListDataObjectsResponse {
        data_objects,
        message: String::new(),
        result: RESULT_OK,
    })
}

async fn increment(
    State(fake): State<Arc<FakeAuthority>>,
    Json(req): Json<CounterDeltaRequest>,
) -> Json<ResultResponse> {
    apply_delta(&fake, req.id, req.int_value)
}

async fn decrement(
    State(fake): State<Arc<FakeAuthority>>,
    Json(req): Json<CounterDeltaRequest>,
) -> Json<ResultResponse> {
    apply_delta(&fake, req.id, -req.int_value)
}

fn apply_delta(fake: &FakeAuthority, id: u64, delta: i64) -> Json<ResultResponse> {
    if fake.data_fails.load(Ordering::SeqCst) {
        return Json(ResultResponse {
            message: "server error".to_string(),
            result: 1,
        });
    }

    let mut counters = fake.counters.lock().unwrap();
    match counters.values_mut().find(|c| c.id == id) {
        Some(counter) => {
            counter.value += delta;
            Json(ResultResponse {
                message: String::new(),
                result: RESULT_OK,
            })
        }
        None => Json(ResultResponse {
            message: "data object not found".to_string(),
            result: 1,
        }),
    }
}

// ============================================================================
// Application under test
// ============================================================================

pub fn test_config(authority_url: &str) -> Config {
    Config {
        authority: AuthorityConfig {
            auth_token: "test-token".to_string(),
            rsa_pub_key: "<RSAKeyValue><Modulus>test</Modulus></RSAKeyValue>".to_string(),
            server_url: authority_url.to_string(),
            timeout_seconds: 2,
        },
        license: LicenseConfig {
            check_interval_seconds: 100,
            product_id: PRODUCT_ID,
            product_key: PRODUCT_KEY.to_string(),
        },
        server: ServerConfig::default(),
    }
}

/// Build the shared state for an application pointed at the given authority.
pub fn build_state(authority_url: &str) -> Arc<AppState> {
    let config = test_config(authority_url);
    let http_client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(config.authority.timeout_seconds))
        .build()
        .unwrap();
    let authority = AuthorityClient::new(
        http_client,
        config.authority.server_url.clone(),
        Credentials::from_config(&config),
    );

    Arc::new(AppState {
        authority,
        config,
        license: LicenseState::new(),
        machine: MachineIdentity::generate(),
        validation_in_flight: AtomicBool::new(false),
    })
}

/// Serve the application's router on an ephemeral loopback port; returns
/// its base URL.
pub async fn spawn_app(state: Arc<AppState>) -> String {
    let app = license_gate::api::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// GET a path and return its status plus the `message` body field.
pub async fn get_message(client: &reqwest::Client, base: &str, path: &str) -> (u16, String) {
    let response = client.get(format!("{base}{path}")).send().await.unwrap();
    let status = response.status().as_u16();
    let body: serde_json::Value = response.json().await.unwrap();
    let message = body["message"].as_str().unwrap_or_default().to_string();
    (status, message)
}
