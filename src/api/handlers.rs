use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, Message};
use crate::license::gate;
use crate::license::record::Feature;
use crate::quota::{self, CounterName, QuotaError};
use crate::AppState;

/// Features gating the `/feat-mix` family. Any one of them being enabled
/// opens the gate.
const FEAT_MIX: [Feature; 3] = [Feature::Feature3, Feature::Feature4, Feature::Feature5];

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub license: &'static str,
    pub status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> (StatusCode, Json<Message>) {
    Message::ok("Hello World")
}

pub async fn feat1(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Message>) {
    if gate::is_enabled(&state.license, Feature::Feature1) {
        return Message::ok("Hello World from feature 1");
    }
    Message::feature_blocked()
}

pub async fn feat2(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Message>) {
    if gate::is_enabled(&state.license, Feature::Feature2) {
        return Message::ok("Hello World from feature 2");
    }
    Message::feature_blocked()
}

pub async fn feat_mix(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Message>) {
    if gate::any_enabled(&state.license, &FEAT_MIX) {
        return Message::ok("Hello World from feature mix");
    }
    Message::feature_blocked()
}

/// Usage-metered variant: every served request bumps the remote usage
/// counter. A counter failure fails the request rather than serving it
/// unmetered.
pub async fn feat_mix_usage(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    if !gate::any_enabled(&state.license, &FEAT_MIX) {
        return Ok(Message::feature_blocked());
    }

    quota::increment(&state.authority, CounterName::MixFeatUsageCount, 1)
        .await
        .map_err(quota_error)?;

    Ok(Message::ok("Hello World from feature mix usage based"))
}

/// Quota-metered variant: checks the remote quota counter up front, serves
/// and consumes one unit while it is positive, answers quota-consumed once
/// it is not. The check and the decrement are separate authority calls.
pub async fn feat_mix_upfront(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    if !gate::any_enabled(&state.license, &FEAT_MIX) {
        return Ok(Message::feature_blocked());
    }

    let name = CounterName::MixFeatQuotaCount;
    let available = quota::is_quota_available(&state.authority, name)
        .await
        .map_err(quota_error)?;
    if !available {
        return Ok(Message::quota_consumed());
    }

    quota::decrement(&state.authority, name, 1)
        .await
        .map_err(quota_error)?;

    Ok(Message::ok("Hello World from feature mix quota based"))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        license: if state.license.is_valid() {
            "valid"
        } else {
            "absent"
        },
        status: "healthy",
    })
}

/// Map a QuotaError to an ApiError
fn quota_error(e: QuotaError) -> ApiError {
    match e {
        QuotaError::Authority(inner) => {
            ApiError::bad_gateway(format!("Licensing authority call failed: {inner}"))
        }
        _ => ApiError::internal(e.to_string()),
    }
}
