//! Domain types and logic for the Global Mobiles storefront.
//!
//! - **Catalog**: main categories, sub categories, products and their
//!   per-type images, held in an in-memory [`Catalog`](catalog::Catalog)
//! - **Cases**: the phone-case taxonomy, case products, variants and the
//!   model compatibility table
//! - **Cart**: cart lines keyed by item and selected type, price snapshots
//!   and selection totals
//!
//! Nothing here performs I/O. The `storage` feature adds conversions from
//! the fetch and cache error types.
//!
//! # Example
//!
//! ```rust,ignore
//! use gm_commerce::prelude::*;
//!
//! let mut catalog = Catalog::new(Currency::INR);
//! let chargers = catalog.create_main_category("Chargers", None)?;
//! let fast = catalog.create_sub_category(chargers.id, "Fast chargers", None)?;
//! let brick = catalog.create_product(&ProductInput::new(fast.id, "20W Brick", "499"))?;
//! catalog.set_type_image(brick.id, VariantType::Type1, "white.png".into())?;
//!
//! let images = catalog.get_type_images(brick.id);
//! let draft = LineDraft::for_product(&brick, &images, Some(VariantType::Type1))?;
//!
//! let mut cart = Cart::new(Currency::INR);
//! cart.add(draft, 2, LineSource::Guest)?;
//! let total = cart.total_selected(&Selection::all(cart.lines()))?;
//! println!("Total: {}", total.display());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod cases;
pub mod catalog;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        Catalog, Discount, EntityKind, ImageRef, ImageUpload, ListFilter, MainCategory, Product,
        ProductInput, SubCategory, TypeImages, VariantType,
    };

    // Cases
    pub use crate::cases::{
        AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductInput,
        CaseVariant, ModelMapping,
    };

    // Cart
    pub use crate::cart::{
        Cart, CartKey, CartLine, ItemRef, LineDraft, LineSource, Selection, MAX_LINE_QUANTITY,
    };
}
