//! [`PublicKeyCache`]: single-slot, lock-free holder for the server key.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::crypto::RsaPublicKey;

/// The server's PEM text together with the key parsed from it.
#[derive(Debug, Clone)]
pub struct CachedKey {
    pub pem: String,
    pub key: RsaPublicKey,
}

/// Process-scoped slot for the server public key.
///
/// Backed by [`ArcSwapOption`] so readers never block. Writes replace the
/// whole entry; two racing writers simply leave the later entry in place.
/// Clones share the same slot.
#[derive(Clone, Debug)]
pub struct PublicKeyCache {
    inner: Arc<ArcSwapOption<CachedKey>>,
}

impl PublicKeyCache {
    /// Create a new, empty [`PublicKeyCache`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Returns `true` once a key has been stored.
    pub fn is_populated(&self) -> bool {
        self.inner.load().is_some()
    }

    /// The cached entry, if any.
    pub fn get(&self) -> Option<Arc<CachedKey>> {
        self.inner.load_full()
    }

    /// Store `entry`, replacing whatever was cached, and return it.
    pub fn store(&self, entry: CachedKey) -> Arc<CachedKey> {
        let entry = Arc::new(entry);
        self.inner.store(Some(Arc::clone(&entry)));
        entry
    }
}

impl Default for PublicKeyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::test_vectors::{PKCS1_1024_PEM, SPKI_1024_PEM, SPKI_2048_PEM};

    fn entry(pem: &str) -> CachedKey {
        CachedKey {
            pem: pem.to_owned(),
            key: RsaPublicKey::from_pem(pem).unwrap(),
        }
    }

    #[test]
    fn initially_empty() {
        let cache = PublicKeyCache::new();
        assert!(!cache.is_populated());
        assert!(cache.get().is_none());
    }

    #[test]
    fn store_and_get() {
        let cache = PublicKeyCache::new();
        cache.store(entry(SPKI_1024_PEM));
        assert!(cache.is_populated());
        assert_eq!(cache.get().unwrap().pem, SPKI_1024_PEM);
    }

    #[test]
    fn later_store_wins() {
        let cache = PublicKeyCache::new();
        cache.store(entry(PKCS1_1024_PEM));
        cache.store(entry(SPKI_2048_PEM));
        assert_eq!(cache.get().unwrap().key.key_byte_len(), 256);
    }

    #[test]
    fn clones_share_the_slot() {
        let cache = PublicKeyCache::new();
        let clone = cache.clone();
        clone.store(entry(SPKI_1024_PEM));
        assert!(cache.is_populated());
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let cache = PublicKeyCache::new();
        cache.store(entry(SPKI_1024_PEM));
        let snapshot = cache.get().unwrap();
        cache.store(entry(SPKI_2048_PEM));
        assert_eq!(snapshot.key.key_byte_len(), 128);
    }
}
