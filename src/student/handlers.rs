//! Student service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::http::{lookup_response, ApiError};
use crate::student::server::StudentState;

pub async fn get_student_address(State(state): State<Arc<StudentState>>, Path(id): Path<i64>) -> Response {
    lookup_response(state.addresses.get_student_address(id).await)
}

pub async fn get_student_address_no_limit(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<i64>,
) -> Response {
    lookup_response(state.addresses.get_student_address_no_limit(id).await)
}

pub async fn get_all_flaky(State(state): State<Arc<StudentState>>) -> Response {
    match state.flaky.get_all_flaky().await {
        Ok(all) => Json(all).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn get_flaky_by_code(State(state): State<Arc<StudentState>>, Path(code): Path<String>) -> Response {
    lookup_response(state.flaky.get_flaky_by_code(&code).await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "UP" }))
}
