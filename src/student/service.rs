//! Address lookups made on behalf of students.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::CallError;
use crate::model::AddressResponse;
use crate::observability::tracing::{call_span, record_outcome};
use crate::resilience::Policy;
use crate::student::client::AddressApi;

/// Outcome label for a present / absent / failed lookup.
pub(crate) fn lookup_outcome<T>(result: &Result<Option<T>, CallError>) -> &'static str {
    match result {
        Ok(Some(_)) => "found",
        Ok(None) => "absent",
        Err(e) => e.kind(),
    }
}

/// Wraps the bounded and unbounded address lookups in their policies.
pub struct AddressProxyService {
    client: Arc<dyn AddressApi>,
    bounded: Arc<Policy>,
    unbounded: Arc<Policy>,
}

impl AddressProxyService {
    pub fn new(client: Arc<dyn AddressApi>, bounded: Arc<Policy>, unbounded: Arc<Policy>) -> Self {
        Self {
            client,
            bounded,
            unbounded,
        }
    }

    pub async fn get_student_address(&self, address_id: i64) -> Result<Option<AddressResponse>, CallError> {
        let span = call_span("student.address", "student-->address", &address_id.to_string());
        let result = self
            .bounded
            .execute(|| self.client.get_address_by_id(address_id))
            .instrument(span.clone())
            .await;
        record_outcome(&span, lookup_outcome(&result));
        result
    }

    pub async fn get_student_address_no_limit(
        &self,
        address_id: i64,
    ) -> Result<Option<AddressResponse>, CallError> {
        let span = call_span("student.address.nolimit", "student-->address", &address_id.to_string());
        let result = self
            .unbounded
            .execute(|| self.client.get_address_by_id_no_limit(address_id))
            .instrument(span.clone())
            .await;
        record_outcome(&span, lookup_outcome(&result));
        result
    }
}
