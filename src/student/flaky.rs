//! Lookups against the intentionally unreliable flaky endpoint.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::CallError;
use crate::model::FlakyDto;
use crate::observability::tracing::{call_span, record_outcome};
use crate::resilience::Policy;
use crate::student::client::AddressApi;
use crate::student::service::lookup_outcome;

/// Retries flaky lookups according to its policy.
pub struct FlakyService {
    client: Arc<dyn AddressApi>,
    policy: Arc<Policy>,
}

impl FlakyService {
    pub fn new(client: Arc<dyn AddressApi>, policy: Arc<Policy>) -> Self {
        Self { client, policy }
    }

    pub async fn get_flaky_by_code(&self, code: &str) -> Result<Option<FlakyDto>, CallError> {
        let span = call_span("student.flaky", "student-->flaky", code);
        let result = self
            .policy
            .execute(|| self.client.get_flaky_by_code(code))
            .instrument(span.clone())
            .await;
        record_outcome(&span, lookup_outcome(&result));
        result
    }

    pub async fn get_all_flaky(&self) -> Result<Vec<FlakyDto>, CallError> {
        let span = call_span("student.flaky.all", "student-->flaky", "*");
        let result = self
            .policy
            .execute(|| self.client.get_all_flaky())
            .instrument(span.clone())
            .await;
        record_outcome(&span, result.as_ref().map_or_else(CallError::kind, |_| "success"));
        result
    }
}
