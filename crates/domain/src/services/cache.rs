use moka::sync::Cache;

use crate::model::{Address, PostalCode};

/// In-process memo in front of the persistent address store. Entries never
/// expire because postal code facts do not change; capacity is bounded and an
/// evicted entry only costs one store read.
#[derive(Debug, Clone)]
pub struct AddressMemo {
    entries: Cache<PostalCode, Address>,
}

impl AddressMemo {
    pub const DEFAULT_CAPACITY: u64 = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity.max(1)).build(),
        }
    }

    pub fn get(&self, postal_code: &PostalCode) -> Option<Address> {
        self.entries.get(postal_code)
    }

    pub fn remember(&self, address: &Address) {
        self.entries
            .insert(address.postal_code.clone(), address.clone());
    }
}

impl Default for AddressMemo {
    fn default() -> Self {
        Self::new()
    }
}
