//! Content-addressed storage abstraction.
//!
//! The [`ContentStore`] trait works on canonical bytes keyed by their
//! [`ContentAddress`]. Backends only need to guarantee that inserting under
//! an address is an atomic check-then-insert and that an address, once
//! written, is never overwritten. The typed [`ContentStoreExt::put`] and
//! [`ContentStoreExt::get`] helpers are available on every backend,
//! including `dyn ContentStore`.
//!
//! Implementations must be `Send + Sync` so a single store can be shared
//! by concurrent request handlers.

pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::hash::{canonical_bytes, sha256_hex};
use crate::models::ContentAddress;

/// Abstract content-addressed storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_if_absent`](ContentStore::insert_if_absent) | Store bytes unless the address already exists |
/// | [`get_bytes`](ContentStore::get_bytes) | Fetch bytes by address |
/// | [`contains`](ContentStore::contains) | Existence check |
/// | [`len`](ContentStore::len) | Number of stored objects |
pub trait ContentStore: Send + Sync {
    /// Store `bytes` under `address` unless an entry already exists.
    ///
    /// Returns `true` when the bytes were written and `false` when the
    /// address was already present (the existing entry is left untouched).
    fn insert_if_absent(&self, address: &ContentAddress, bytes: &[u8]) -> Result<bool>;

    /// Fetch the bytes stored under `address`, or `None` if unknown.
    fn get_bytes(&self, address: &ContentAddress) -> Result<Option<Vec<u8>>>;

    fn contains(&self, address: &ContentAddress) -> Result<bool>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Typed `put`/`get` on top of any [`ContentStore`].
pub trait ContentStoreExt: ContentStore {
    /// Canonically serialize `object`, store it, and return its address.
    ///
    /// Storing content that is already present returns the existing address
    /// without rewriting it.
    fn put<T: Serialize + ?Sized>(&self, object: &T) -> Result<ContentAddress> {
        let bytes = canonical_bytes(object)?;
        let address = ContentAddress::from(sha256_hex(&bytes));
        self.insert_if_absent(&address, &bytes)?;
        Ok(address)
    }

    /// Fetch and deserialize the object stored under `address`.
    ///
    /// An unknown address is `Ok(None)`: a normal negative result.
    fn get<T: DeserializeOwned>(&self, address: &ContentAddress) -> Result<Option<T>> {
        match self.get_bytes(address)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl<S: ContentStore + ?Sized> ContentStoreExt for S {}
