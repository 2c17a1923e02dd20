//! Typed key-value persistence for the Global Mobiles storefront.
//!
//! Holds the client-side state that must survive a reload: the guest cart
//! and the session tokens. Values are JSON encoded, except opaque strings
//! which are stored verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use gm_cache::{Cache, Document};
//!
//! let cache = Cache::in_memory();
//!
//! // Store a value
//! cache.set("cart", &records)?;
//!
//! // Retrieve a value
//! let records: Option<Vec<GuestRecord>> = cache.get("cart")?;
//!
//! // Or bind a typed document to the key
//! let doc: Document<Vec<GuestRecord>> = Document::new(cache, "cart");
//! doc.clear()?;
//! ```

mod document;
mod error;
mod kv;
mod store;

pub use document::Document;
pub use error::CacheError;
pub use kv::Cache;
pub use store::{KvStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Document, KvStore, MemoryStore};
}
