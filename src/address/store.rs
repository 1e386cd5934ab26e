//! In-memory address catalogue.

use std::collections::HashMap;

use crate::model::AddressResponse;

/// Records in configured order, indexed by id.
#[derive(Debug, Default)]
pub struct AddressStore {
    records: Vec<AddressResponse>,
    index: HashMap<i64, usize>,
}

impl AddressStore {
    /// Build a store. On duplicate ids the first record wins.
    pub fn new(records: Vec<AddressResponse>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.id).or_insert(position);
        }
        Self { records, index }
    }

    pub fn find_by_id(&self, id: i64) -> Option<&AddressResponse> {
        self.index.get(&id).map(|&position| &self.records[position])
    }

    pub fn find_all(&self) -> &[AddressResponse] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
