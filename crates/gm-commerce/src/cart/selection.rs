//! Which cart lines the shopper has ticked for checkout.

use crate::cart::{CartKey, CartLine};
use std::collections::BTreeSet;

/// A set of selected cart keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<CartKey>);

impl Selection {
    /// Everything selected, the state the cart opens in.
    pub fn all(lines: &[CartLine]) -> Self {
        Self(lines.iter().map(CartLine::key).collect())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: CartKey) -> bool {
        self.0.insert(key)
    }

    pub fn remove(&mut self, key: &CartKey) -> bool {
        self.0.remove(key)
    }

    /// Flip one key, returning whether it is now selected.
    pub fn toggle(&mut self, key: CartKey) -> bool {
        if self.0.remove(&key) {
            false
        } else {
            self.0.insert(key);
            true
        }
    }

    pub fn contains(&self, key: &CartKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop keys whose line no longer exists.
    pub fn retain_existing(&mut self, lines: &[CartLine]) {
        let live: BTreeSet<CartKey> = lines.iter().map(CartLine::key).collect();
        self.0.retain(|k| live.contains(k));
    }
}

impl FromIterator<CartKey> for Selection {
    fn from_iter<I: IntoIterator<Item = CartKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
