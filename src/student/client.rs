//! Cross-service client for the address service.
//!
//! # Responsibilities
//! - Translate method calls into GET requests against the address service
//! - Decode JSON bodies into typed values
//! - Classify every failure as a [`CallError`]
//!
//! # Design Decisions
//! - No retry or breaker logic here; callers wrap calls in a `Policy`
//! - 404 on a single-resource lookup is `Ok(None)`, not an error
//! - Base URL may carry a path prefix; endpoint segments are appended to it

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::StudentServiceConfig;
use crate::error::CallError;
use crate::model::{AddressResponse, FlakyDto};

/// Operations the student service needs from the address service.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn get_address_by_id(&self, id: i64) -> Result<Option<AddressResponse>, CallError>;

    async fn get_address_by_id_no_limit(&self, id: i64) -> Result<Option<AddressResponse>, CallError>;

    async fn get_flaky_by_code(&self, code: &str) -> Result<Option<FlakyDto>, CallError>;

    async fn get_all_flaky(&self) -> Result<Vec<FlakyDto>, CallError>;
}

/// Error building the HTTP client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid address service URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("address service URL cannot take a path: {0}")]
    NotABase(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// [`AddressApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAddressClient {
    client: reqwest::Client,
    base_url: Url,
    flaky_segments: Vec<String>,
    request_timeout: Duration,
}

impl HttpAddressClient {
    pub fn new(config: &StudentServiceConfig) -> Result<Self, ClientBuildError> {
        let base_url = Url::parse(&config.address_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::NotABase(config.address_base_url.clone()));
        }

        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            flaky_segments: segments(&config.flaky_path),
            request_timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn flaky_endpoint(&self, code: Option<&str>) -> Url {
        let mut parts: Vec<&str> = self.flaky_segments.iter().map(String::as_str).collect();
        parts.extend(code);
        self.endpoint(&parts)
    }

    /// GET `url`. With `absent_on_404` a 404 becomes `Ok(None)`.
    async fn fetch<T: DeserializeOwned>(&self, url: Url, absent_on_404: bool) -> Result<Option<T>, CallError> {
        tracing::debug!(url = %url, "Calling address service");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND && absent_on_404 {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::debug!(status = %status, "Address service returned an error status");
            return Err(CallError::Upstream(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> CallError {
        if err.is_timeout() {
            CallError::Timeout(self.request_timeout)
        } else if err.is_decode() {
            CallError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            CallError::Upstream(status.as_u16())
        } else {
            CallError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl AddressApi for HttpAddressClient {
    async fn get_address_by_id(&self, id: i64) -> Result<Option<AddressResponse>, CallError> {
        let url = self.endpoint(&["api", "v1", "address", &id.to_string()]);
        self.fetch(url, true).await
    }

    async fn get_address_by_id_no_limit(&self, id: i64) -> Result<Option<AddressResponse>, CallError> {
        let url = self.endpoint(&["api", "v1", "address", "nolimit", &id.to_string()]);
        self.fetch(url, true).await
    }

    async fn get_flaky_by_code(&self, code: &str) -> Result<Option<FlakyDto>, CallError> {
        self.fetch(self.flaky_endpoint(Some(code)), true).await
    }

    async fn get_all_flaky(&self) -> Result<Vec<FlakyDto>, CallError> {
        let all = self.fetch(self.flaky_endpoint(None), false).await?;
        Ok(all.unwrap_or_default())
    }
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpAddressClient {
        let mut config = StudentServiceConfig::default();
        config.address_base_url = base.to_string();
        HttpAddressClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let c = client("http://127.0.0.1:8080");
        assert_eq!(
            c.endpoint(&["api", "v1", "address", "42"]).as_str(),
            "http://127.0.0.1:8080/api/v1/address/42"
        );
        assert_eq!(c.flaky_endpoint(None).as_str(), "http://127.0.0.1:8080/api/v1/flaky");
        assert_eq!(
            c.flaky_endpoint(Some("a/b")).as_str(),
            "http://127.0.0.1:8080/api/v1/flaky/a%2Fb"
        );
    }

    #[test]
    fn test_base_url_prefix_is_kept() {
        let c = client("http://gateway.local/address-service/");
        assert_eq!(
            c.endpoint(&["api", "v1", "address", "nolimit", "7"]).as_str(),
            "http://gateway.local/address-service/api/v1/address/nolimit/7"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = StudentServiceConfig::default();
        config.address_base_url = "mailto:someone@example.com".into();
        assert!(matches!(
            HttpAddressClient::new(&config),
            Err(ClientBuildError::NotABase(_))
        ));

        config.address_base_url = "::".into();
        assert!(matches!(
            HttpAddressClient::new(&config),
            Err(ClientBuildError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = client(&format!("http://{addr}"));
        let err = c.get_address_by_id(1).await.unwrap_err();
        assert!(matches!(err, CallError::Transport(_)), "got {err:?}");
        assert!(err.is_retryable());
    }
}
