//! Guest and signed-in carts behind one interface.

#[cfg(test)]
mod fake_server;
mod guest;
mod server;
mod session;

pub use guest::GuestCart;
pub use server::ServerCart;
pub use session::{CartMode, CartSession, MergeReport};

use async_trait::async_trait;
use gm_commerce::cart::{CartKey, CartLine, LineDraft};
use gm_commerce::CommerceError;

/// Where cart lines live.
///
/// Both stores normalize their records into [`CartLine`]s. A failed
/// mutation leaves [`CartBackend::list`] unchanged.
#[async_trait(?Send)]
pub trait CartBackend {
    /// Add `quantity` of a draft, merging into an existing line.
    async fn add(&self, draft: LineDraft, quantity: u32) -> Result<CartLine, CommerceError>;

    /// Change a line's quantity by `delta`, clamped to at least 1.
    ///
    /// `None` when the line is not in the cart.
    async fn update_quantity(
        &self,
        key: &CartKey,
        delta: i64,
    ) -> Result<Option<u32>, CommerceError>;

    /// Remove a line. Removing an absent line is a no-op returning false.
    async fn remove(&self, key: &CartKey) -> Result<bool, CommerceError>;

    async fn list(&self) -> Result<Vec<CartLine>, CommerceError>;

    async fn clear(&self) -> Result<(), CommerceError>;
}
