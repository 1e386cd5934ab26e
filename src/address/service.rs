//! Address lookups over a hot-swappable catalogue.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::address::flaky::FlakyCatalogue;
use crate::address::store::AddressStore;
use crate::config::AddressServiceConfig;
use crate::model::{AddressResponse, FlakyDto};
use crate::observability::tracing::{call_span, record_outcome};

/// Which route a lookup arrived on. Both read the same catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTier {
    Standard,
    NoLimit,
}

impl LookupTier {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupTier::Standard => "standard",
            LookupTier::NoLimit => "no-limit",
        }
    }
}

#[derive(Debug)]
pub struct AddressService {
    store: ArcSwap<AddressStore>,
    flaky: ArcSwap<FlakyCatalogue>,
}

impl AddressService {
    pub fn new(config: &AddressServiceConfig) -> Self {
        Self {
            store: ArcSwap::from_pointee(AddressStore::new(config.records.clone())),
            flaky: ArcSwap::from_pointee(FlakyCatalogue::new(&config.flaky)),
        }
    }

    pub fn find_by_id(&self, id: i64, tier: LookupTier) -> Option<AddressResponse> {
        let span = call_span("address.lookup", "address-->database", &id.to_string());
        let _entered = span.enter();

        tracing::info!(id, tier = tier.as_str(), "get address with id");
        let found = self.store.load().find_by_id(id).cloned();
        record_outcome(&span, if found.is_some() { "found" } else { "absent" });
        found
    }

    pub fn find_all(&self) -> Vec<AddressResponse> {
        self.store.load().find_all().to_vec()
    }

    pub fn flaky(&self) -> Arc<FlakyCatalogue> {
        self.flaky.load_full()
    }

    pub fn find_flaky(&self, code: &str) -> Option<FlakyDto> {
        self.flaky.load().find_by_code(code).cloned()
    }

    /// Swap in a new catalogue. In-flight lookups finish on the old one.
    pub fn reload(&self, config: &AddressServiceConfig) {
        let store = AddressStore::new(config.records.clone());
        tracing::info!(records = store.len(), flaky = config.flaky.records.len(), "Address catalogue reloaded");
        self.store.store(Arc::new(store));
        self.flaky.store(Arc::new(FlakyCatalogue::new(&config.flaky)));
    }
}
