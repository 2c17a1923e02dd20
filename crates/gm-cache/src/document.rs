//! Single-key typed documents.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// A typed value persisted under one fixed key.
///
/// # Example
///
/// ```rust,ignore
/// use gm_cache::{Cache, Document};
///
/// let doc: Document<Vec<GuestRecord>> = Document::new(cache, "cart");
///
/// // Missing key reads as the default value
/// let lines = doc.load()?;
///
/// // Read-modify-write
/// doc.update(|lines| lines.retain(|l| l.qty > 0))?;
///
/// doc.clear()?;
/// ```
pub struct Document<T> {
    cache: Cache,
    key: String,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Document<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Bind a document to `key` in `cache`.
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
            _phantom: PhantomData,
        }
    }

    /// The key this document lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the document if it has been written.
    pub fn get(&self) -> Result<Option<T>, CacheError> {
        self.cache.get(&self.key)
    }

    /// Get the document, or the default value if it has never been written.
    pub fn load(&self) -> Result<T, CacheError> {
        Ok(self.get()?.unwrap_or_default())
    }

    /// Overwrite the document.
    pub fn save(&self, value: &T) -> Result<(), CacheError> {
        self.cache.set(&self.key, value)
    }

    /// Load, apply `f`, and save.
    ///
    /// Nothing is written if loading fails. Returns whatever `f` returns.
    pub fn update<F, R>(&self, f: F) -> Result<R, CacheError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut data = self.load()?;
        let result = f(&mut data);
        self.save(&data)?;
        Ok(result)
    }

    /// Remove the document.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.key)
    }

    /// Check whether the document has been written.
    pub fn exists(&self) -> Result<bool, CacheError> {
        self.cache.exists(&self.key)
    }
}
