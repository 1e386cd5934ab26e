use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::resilience::PolicySnapshot;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ResetResult {
    pub policy: String,
    pub reset: bool,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_resilience(State(state): State<Arc<AdminState>>) -> Json<Vec<PolicySnapshot>> {
    Json(state.registry.snapshots())
}

pub async fn reset_policy(
    State(state): State<Arc<AdminState>>,
    Path(name): Path<String>,
) -> Result<Json<ResetResult>, StatusCode> {
    if state.registry.reset(&name) {
        Ok(Json(ResetResult {
            policy: name,
            reset: true,
        }))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
