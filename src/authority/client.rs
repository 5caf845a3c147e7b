//! HTTP client for the remote licensing authority.
//!
//! The authority is the sole source of truth for license validity and
//! counter values; this client wraps its JSON API and converts wire shapes
//! into domain types at the response boundary. Failures come back as
//! structured [`AuthorityError`]s — callers decide whether they are fatal.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::wire::{
    ActivateRequest, ActivateResponse, CounterDeltaRequest, DeactivateRequest,
    ListDataObjectsRequest, ListDataObjectsResponse, ResultResponse, RESULT_OK,
};
use crate::config::Config;
use crate::license::record::LicenseRecord;
use crate::quota::NamedCounter;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Authority reported success but returned no license record")]
    MissingRecord,
    #[error("Authority rejected the call: {0}")]
    Rejected(String),
    #[error("Authority returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Authority request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Credentials identifying this deployment to the authority.
#[derive(Clone)]
pub struct Credentials {
    pub auth_token: String,
    pub product_id: u32,
    pub product_key: String,
    pub rsa_pub_key: String,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auth_token: config.authority.auth_token.clone(),
            product_id: config.license.product_id,
            product_key: config.license.product_key.clone(),
            rsa_pub_key: config.authority.rsa_pub_key.clone(),
        }
    }
}

pub struct AuthorityClient {
    base_url: String,
    credentials: Credentials,
    http: reqwest::Client,
}

impl AuthorityClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            http,
        }
    }

    /// Activate (or re-validate) the license key for the given machine code,
    /// claiming a floating slot for `floating_interval_seconds`.
    pub async fn activate(
        &self,
        machine_code: &str,
        floating_interval_seconds: u64,
    ) -> Result<LicenseRecord, AuthorityError> {
        let request = ActivateRequest {
            floating_time_interval: floating_interval_seconds,
            key: self.credentials.product_key.clone(),
            machine_code: machine_code.to_string(),
            product_id: self.credentials.product_id,
            public_key: self.credentials.rsa_pub_key.clone(),
            token: self.credentials.auth_token.clone(),
        };

        let response: ActivateResponse = self.post("/api/key/activate", &request).await?;
        check_result(response.result, response.message)?;

        let wire = response.license_key.ok_or(AuthorityError::MissingRecord)?;
        Ok(wire.into())
    }

    /// Release this machine's activation slot.
    pub async fn deactivate(
        &self,
        machine_code: &str,
        floating: bool,
    ) -> Result<(), AuthorityError> {
        let request = DeactivateRequest {
            floating,
            key: self.credentials.product_key.clone(),
            machine_code: machine_code.to_string(),
            product_id: self.credentials.product_id,
            token: self.credentials.auth_token.clone(),
        };

        let response: ResultResponse = self.post("/api/key/deactivate", &request).await?;
        check_result(response.result, response.message)
    }

    /// List remote counters whose name contains the given substring, scoped
    /// to this license key.
    pub async fn list_counters(
        &self,
        name_contains: &str,
    ) -> Result<Vec<NamedCounter>, AuthorityError> {
        let request = ListDataObjectsRequest {
            key: self.credentials.product_key.clone(),
            name_contains: name_contains.to_string(),
            product_id: self.credentials.product_id,
            token: self.credentials.auth_token.clone(),
        };

        let response: ListDataObjectsResponse = self.post("/api/data/list", &request).await?;
        check_result(response.result, response.message)?;

        Ok(response.data_objects.into_iter().map(Into::into).collect())
    }

    /// Apply a relative increase to a counter by its remote id.
    pub async fn increment_counter(
        &self,
        counter_id: u64,
        delta: i64,
    ) -> Result<(), AuthorityError> {
        self.apply_delta("/api/data/increment", counter_id, delta)
            .await
    }

    /// Apply a relative decrease to a counter by its remote id.
    pub async fn decrement_counter(
        &self,
        counter_id: u64,
        delta: i64,
    ) -> Result<(), AuthorityError> {
        self.apply_delta("/api/data/decrement", counter_id, delta)
            .await
    }

    async fn apply_delta(
        &self,
        path: &str,
        counter_id: u64,
        delta: i64,
    ) -> Result<(), AuthorityError> {
        let request = CounterDeltaRequest {
            id: counter_id,
            int_value: delta,
            key: self.credentials.product_key.clone(),
            product_id: self.credentials.product_id,
            token: self.credentials.auth_token.clone(),
        };

        let response: ResultResponse = self.post(path, &request).await?;
        check_result(response.result, response.message)
    }

    async fn post<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, AuthorityError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(AuthorityError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

// Credentials carry the product key and access token — keep them out of
// Debug output.
impl std::fmt::Debug for AuthorityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityClient")
            .field("base_url", &self.base_url)
            .field("product_id", &self.credentials.product_id)
            .finish()
    }
}

fn check_result(result: i32, message: String) -> Result<(), AuthorityError> {
    if result == RESULT_OK {
        Ok(())
    } else {
        Err(AuthorityError::Rejected(message))
    }
}
