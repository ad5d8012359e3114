//! In-memory [`ContentStore`] for tests and ephemeral deployments.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`. Reads share the lock;
//! the dedup check and the insert happen under a single write guard.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::models::ContentAddress;

use super::ContentStore;

pub struct InMemoryContentStore {
    objects: RwLock<HashMap<ContentAddress, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn insert_if_absent(&self, address: &ContentAddress, bytes: &[u8]) -> Result<bool> {
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        if objects.contains_key(address) {
            return Ok(false);
        }
        objects.insert(address.clone(), bytes.to_vec());
        Ok(true)
    }

    fn get_bytes(&self, address: &ContentAddress) -> Result<Option<Vec<u8>>> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.get(address).cloned())
    }

    fn contains(&self, address: &ContentAddress) -> Result<bool> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.contains_key(address))
    }

    fn len(&self) -> Result<usize> {
        let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
        Ok(objects.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvidenceRecord;
    use crate::store::ContentStoreExt;
    use std::sync::Arc;

    fn onion() -> EvidenceRecord {
        EvidenceRecord::new(
            1000.0,
            "price of onion",
            "Rs 20/kg",
            vec!["Agmarknet Portal".to_string()],
        )
    }

    #[test]
    fn put_is_deterministic_and_deduplicates() {
        let store = InMemoryContentStore::new();
        let first = store.put(&onion()).unwrap();
        let second = store.put(&onion()).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn different_content_gets_different_address() {
        let store = InMemoryContentStore::new();
        let a = store.put(&onion()).unwrap();
        let b = store
            .put(&EvidenceRecord::new(1000.0, "price of onion", "Rs 25/kg", vec![]))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn get_round_trips_and_unknown_is_none() {
        let store = InMemoryContentStore::new();
        let address = store.put(&onion()).unwrap();
        let back: Option<EvidenceRecord> = store.get(&address).unwrap();
        assert_eq!(back, Some(onion()));

        let missing: Option<EvidenceRecord> =
            store.get(&ContentAddress::from("f".repeat(64))).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn existing_address_is_never_overwritten() {
        let store = InMemoryContentStore::new();
        let address = ContentAddress::from("a".repeat(64));
        assert!(store.insert_if_absent(&address, b"first").unwrap());
        assert!(!store.insert_if_absent(&address, b"second").unwrap());
        assert_eq!(store.get_bytes(&address).unwrap().unwrap(), b"first");
    }

    #[test]
    fn concurrent_puts_of_same_content_store_once() {
        let store = Arc::new(InMemoryContentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.put(&onion()).unwrap())
            })
            .collect();
        let addresses: Vec<ContentAddress> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len().unwrap(), 1);
    }
}
