//! Key-Value store wrapper with automatic serialization.

use crate::store::{KvStore, MemoryStore};
use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::rc::Rc;

/// Type-safe cache over a [`KvStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and every clone
/// talks to the same underlying store.
#[derive(Clone)]
pub struct Cache {
    store: Rc<dyn KvStore>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Wrap a store.
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self {
            store: Rc::new(store),
        }
    }

    /// Wrap a store that is already shared elsewhere.
    pub fn from_shared(store: Rc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// A cache over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the default Spin Key-Value store.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_default()?;
    /// ```
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::new(crate::store::SpinStore::open_default()?))
    }

    /// Open a named Spin Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self::new(crate::store::SpinStore::open(name)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let lines: Option<Vec<GuestRecord>> = cache.get("cart")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Get a plain string stored without JSON encoding.
    ///
    /// Opaque values such as bearer tokens are kept verbatim.
    pub fn get_text(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CacheError::StoreError(format!("Invalid UTF-8 under {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Store a plain string without JSON encoding.
    pub fn set_text(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store.set(key, value.as_bytes())
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }
}
