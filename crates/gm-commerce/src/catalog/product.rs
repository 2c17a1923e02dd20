//! Products, discounts and product input validation.

use crate::catalog::{validate_name, ImageRef};
use crate::error::CommerceError;
use crate::ids::{ProductId, SubCategoryId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A discount percentage in `0..=100`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Discount(u8);

impl Discount {
    pub const NONE: Discount = Discount(0);

    /// Validate a percentage.
    pub fn new(percent: i64) -> Result<Self, CommerceError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Discount)
            .ok_or_else(|| {
                CommerceError::invalid(format!(
                    "discount must be between 0 and 100, got {percent}"
                ))
            })
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// The discounted price, rounded half-up to the minor unit.
    pub fn apply(&self, price: Money) -> Money {
        price.discounted(self.0)
    }
}

impl TryFrom<i64> for Discount {
    type Error = CommerceError;

    fn try_from(percent: i64) -> Result<Self, Self::Error> {
        Discount::new(percent)
    }
}

impl From<Discount> for u8 {
    fn from(d: Discount) -> u8 {
        d.0
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub subtitle: String,
    /// List price before discount.
    pub price: Money,
    #[serde(rename = "discount_percent")]
    pub discount: Discount,
    pub is_available: bool,
    pub sub_category_id: SubCategoryId,
    /// Listing image, the `type1` image when one exists.
    pub cover: Option<ImageRef>,
}

impl Product {
    /// The price a shopper pays right now.
    pub fn effective_price(&self) -> Money {
        self.discount.apply(self.price)
    }

    pub fn has_discount(&self) -> bool {
        self.discount.percent() > 0
    }
}

/// Raw product fields as entered on the admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub subtitle: String,
    /// Decimal price text, e.g. `"499"`.
    pub price: String,
    pub discount_percent: i64,
    pub sub_category_id: SubCategoryId,
}

impl ProductInput {
    pub fn new(
        sub_category_id: SubCategoryId,
        name: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subtitle: String::new(),
            price: price.into(),
            discount_percent: 0,
            sub_category_id,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn discount(mut self, percent: i64) -> Self {
        self.discount_percent = percent;
        self
    }

    /// Check every field without touching any store.
    pub fn validate(&self, currency: Currency) -> Result<ProductFields, CommerceError> {
        Ok(ProductFields {
            name: validate_name("product name", &self.name)?,
            subtitle: self.subtitle.trim().to_string(),
            price: Money::parse(&self.price, currency)?,
            discount: Discount::new(self.discount_percent)?,
            sub_category_id: self.sub_category_id,
        })
    }
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub subtitle: String,
    pub price: Money,
    pub discount: Discount,
    pub sub_category_id: SubCategoryId,
}
