//! Address service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::address::service::{AddressService, LookupTier};
use crate::http::found_or_not_found;
use crate::model::{AddressResponse, FlakyDto};

pub async fn get_all_addresses(State(service): State<Arc<AddressService>>) -> Json<Vec<AddressResponse>> {
    Json(service.find_all())
}

pub async fn get_address_by_id(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<i64>,
) -> Response {
    found_or_not_found(service.find_by_id(id, LookupTier::Standard))
}

pub async fn get_unlimited_address_by_id(
    State(service): State<Arc<AddressService>>,
    Path(id): Path<i64>,
) -> Response {
    found_or_not_found(service.find_by_id(id, LookupTier::NoLimit))
}

pub async fn get_all_flaky(State(service): State<Arc<AddressService>>) -> Response {
    let flaky = service.flaky();
    if flaky.should_fail() {
        return flaky_failure();
    }
    Json(flaky.find_all().to_vec()).into_response()
}

pub async fn get_flaky_by_code(
    State(service): State<Arc<AddressService>>,
    Path(code): Path<String>,
) -> Response {
    if service.flaky().should_fail() {
        return flaky_failure();
    }
    found_or_not_found::<FlakyDto>(service.find_flaky(&code))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "UP" }))
}

fn flaky_failure() -> Response {
    tracing::debug!("Injecting flaky failure");
    (StatusCode::SERVICE_UNAVAILABLE, "flaky resource unavailable").into_response()
}
