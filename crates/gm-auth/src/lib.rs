//! Authentication for the Global Mobiles storefront.
//!
//! Shoppers and admins sign in against the API and receive opaque bearer
//! tokens. The [`Session`] keeps those tokens and the shopper profile in
//! the client store so they survive a reload.

mod client;
mod error;
mod session;
mod token;
mod user;

pub use client::AuthClient;
pub use error::AuthError;
pub use session::{Session, StorageKeys};
pub use token::{Audience, AuthToken};
pub use user::{AdminCredentials, Credentials, Registration, UserProfile};
