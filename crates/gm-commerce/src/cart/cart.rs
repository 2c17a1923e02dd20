//! Cart arithmetic shared by the guest and server carts.

use crate::cart::{CartKey, CartLine, LineDraft, LineSource, Selection};
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line.
pub const MAX_LINE_QUANTITY: u32 = 9999;

/// An ordered list of cart lines, at most one per [`CartKey`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: Currency,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

impl Cart {
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Build a cart from lines read back from a store.
    ///
    /// Lines sharing a key are folded into the first one. Stored quantities
    /// are clamped to `1..=MAX_LINE_QUANTITY`, folded ones included.
    pub fn from_lines(currency: Currency, lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Cart::new(currency);
        for mut line in lines {
            match cart.lines.iter_mut().find(|l| l.key() == line.key()) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_LINE_QUANTITY);
                }
                None => {
                    line.quantity = line.quantity.clamp(1, MAX_LINE_QUANTITY);
                    cart.lines.push(line);
                }
            }
        }
        cart
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Add `quantity` of a draft.
    ///
    /// An existing line with the same key keeps its price snapshot and gains
    /// the quantity; otherwise a new line is appended.
    pub fn add(
        &mut self,
        draft: LineDraft,
        quantity: u32,
        source: LineSource,
    ) -> Result<&CartLine, CommerceError> {
        check_quantity(quantity)?;
        let key = draft.key();
        let index = match self.lines.iter().position(|l| l.key() == key) {
            Some(i) => {
                let line = &mut self.lines[i];
                line.quantity = bump(line.quantity, quantity)?;
                i
            }
            None => {
                self.lines.push(CartLine {
                    item: draft.item,
                    selected_type: draft.selected_type,
                    name: draft.name,
                    image: draft.image,
                    unit_price_at_add: draft.unit_price,
                    quantity,
                    source,
                });
                self.lines.len() - 1
            }
        };
        tracing::debug!(?key, quantity, "cart add");
        Ok(&self.lines[index])
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Returns the new quantity, or `None` when the key is not in the cart.
    pub fn update_quantity(&mut self, key: &CartKey, delta: i64) -> Option<u32> {
        let line = self.lines.iter_mut().find(|l| &l.key() == key)?;
        let next = (i64::from(line.quantity) + delta).clamp(1, i64::from(MAX_LINE_QUANTITY));
        line.quantity = u32::try_from(next).unwrap_or(MAX_LINE_QUANTITY);
        tracing::debug!(?key, delta, quantity = line.quantity, "cart update");
        Some(line.quantity)
    }

    /// Remove a line. Returns false when it was not there.
    pub fn remove(&mut self, key: &CartKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key() != key);
        self.lines.len() < before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn get(&self, key: &CartKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.key() == key)
    }

    /// Sum of quantities, shown on the cart badge.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total of the selected lines at their snapshot prices.
    pub fn total_selected(&self, selection: &Selection) -> Result<Money, CommerceError> {
        total_selected(&self.lines, selection, self.currency)
    }
}

/// Σ `unit_price_at_add × quantity` over the selected lines.
pub fn total_selected(
    lines: &[CartLine],
    selection: &Selection,
    currency: Currency,
) -> Result<Money, CommerceError> {
    let totals = lines
        .iter()
        .filter(|l| selection.contains(&l.key()))
        .map(CartLine::line_total)
        .collect::<Result<Vec<_>, _>>()?;
    Money::try_sum(totals.iter(), currency).ok_or(CommerceError::Overflow)
}

fn check_quantity(quantity: u32) -> Result<(), CommerceError> {
    if quantity == 0 {
        return Err(CommerceError::invalid("quantity must be at least 1"));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CommerceError::invalid(format!(
            "quantity {quantity} exceeds the limit of {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

fn bump(current: u32, more: u32) -> Result<u32, CommerceError> {
    let next = current.checked_add(more).ok_or(CommerceError::Overflow)?;
    check_quantity(next)?;
    Ok(next)
}
