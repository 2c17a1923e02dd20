//! Cart lines, cart arithmetic and checkout selection.

#[allow(clippy::module_inception)]
mod cart;
mod line;
mod selection;

pub use cart::{total_selected, Cart, MAX_LINE_QUANTITY};
pub use line::{CartKey, CartLine, ItemRef, LineDraft, LineSource};
pub use selection::Selection;
