//! Storefront services for Global Mobiles.
//!
//! The catalog and case taxonomy sit behind [`CatalogStore`], with an
//! in-process implementation for tests and tooling and a REST one for the
//! live API. The shopper's cart lives in the client store while signed out
//! and on the server while signed in; [`CartSession`] picks the right one
//! and moves the guest cart across after login.
//!
//! [`Storefront`] wires all of it from a [`StorefrontConfig`].

pub mod cart;
pub mod catalog;
pub mod config;
pub mod images;
mod storefront;

pub use cart::{CartBackend, CartMode, CartSession, GuestCart, MergeReport, ServerCart};
pub use catalog::{CatalogStore, MemoryCatalog, RemoteCatalog, UploadReport};
pub use config::StorefrontConfig;
pub use images::{ImageFolder, ImageStore, MemoryImageStore};
pub use storefront::Storefront;
