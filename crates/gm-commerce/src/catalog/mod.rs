//! The product hierarchy: main categories, sub categories, products and
//! their per-type images.

#[allow(clippy::module_inception)]
mod catalog;
mod category;
mod image;
mod product;
mod variant;
mod visibility;

pub use catalog::Catalog;
pub use category::{MainCategory, SubCategory};
pub use image::{ImageRef, ImageUpload};
pub use product::{Discount, Product, ProductFields, ProductInput};
pub use variant::{TypeImages, VariantType};
pub use visibility::{EntityKind, ListFilter};

use crate::error::CommerceError;

/// Trim a display name, rejecting one that ends up empty.
pub fn validate_name(field: &str, value: &str) -> Result<String, CommerceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommerceError::invalid(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
