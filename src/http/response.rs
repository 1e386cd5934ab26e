//! Mapping call results to HTTP responses.
//!
//! | result | status |
//! |---|---|
//! | `Ok(Some(v))` | 200 + JSON |
//! | `Ok(None)` | 404, empty body |
//! | circuit open / bulkhead full | 503 + JSON error |
//! | timeout | 504 + JSON error |
//! | transport, upstream status, decode | 502 + JSON error |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::CallError;

/// 200 with the value, or 404 with an empty body.
pub fn found_or_not_found<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(value) => Json(value).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Wire form of a failed call.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A failed upstream call on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CallError);

impl From<CallError> for ApiError {
    fn from(err: CallError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CallError::CircuitOpen { .. } | CallError::BulkheadFull { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CallError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CallError::Transport(_) | CallError::Upstream(_) | CallError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Map a lookup result: present, absent, or failed.
pub fn lookup_response<T: Serialize>(result: Result<Option<T>, CallError>) -> Response {
    match result {
        Ok(value) => found_or_not_found(value),
        Err(e) => ApiError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_present_and_absent() {
        let ok = lookup_response(Ok(Some(serde_json::json!({"id": 42}))));
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_string(ok).await, r#"{"id":42}"#);

        let missing = lookup_response::<u8>(Ok(None));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(body_string(missing).await.is_empty());
    }

    #[tokio::test]
    async fn test_circuit_open_is_not_a_404() {
        let response = lookup_response::<u8>(Err(CallError::CircuitOpen { name: "address".into() }));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "circuit_open");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CallError::Timeout(Duration::from_secs(1)), StatusCode::GATEWAY_TIMEOUT),
            (CallError::Transport("reset".into()), StatusCode::BAD_GATEWAY),
            (CallError::Upstream(500), StatusCode::BAD_GATEWAY),
            (CallError::Decode("eof".into()), StatusCode::BAD_GATEWAY),
            (
                CallError::BulkheadFull { name: "a".into(), max_concurrent: 1 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
