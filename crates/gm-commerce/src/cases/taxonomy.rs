//! The phone-case taxonomy: main category, phone family, device model,
//! plus the case products sold against it.

use crate::catalog::{validate_name, Discount, ImageRef, VariantType};
use crate::error::CommerceError;
use crate::ids::{
    CaseMainCategoryId, CaseModelId, CasePhoneId, CaseProductId, CaseVariantId,
};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Brand-level grouping, e.g. "iPhone".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseMainCategory {
    pub id: CaseMainCategoryId,
    pub name: String,
    pub is_active: bool,
}

/// A phone family under a case main category, e.g. "iPhone 15".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CasePhone {
    pub id: CasePhoneId,
    pub name: String,
    pub main_category_id: CaseMainCategoryId,
    pub is_active: bool,
}

/// A specific device, e.g. "iPhone 15 Pro Max".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseModel {
    pub id: CaseModelId,
    pub name: String,
    pub phone_id: CasePhoneId,
    pub is_active: bool,
}

/// A case design, sold for whichever models it is mapped to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseProduct {
    pub id: CaseProductId,
    pub title: String,
    pub subtitle: String,
    pub price: Money,
    #[serde(rename = "discount_percent")]
    pub discount: Discount,
    pub is_active: bool,
}

impl CaseProduct {
    pub fn effective_price(&self) -> Money {
        self.discount.apply(self.price)
    }
}

/// The image for one variant slot of a case product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseVariant {
    pub id: CaseVariantId,
    pub case_product_id: CaseProductId,
    pub variant_type: VariantType,
    pub image: ImageRef,
    pub is_active: bool,
}

/// Raw case product fields as entered on the admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseProductInput {
    pub title: String,
    pub subtitle: String,
    pub price: String,
    pub discount_percent: i64,
}

impl CaseProductInput {
    pub fn new(title: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            price: price.into(),
            discount_percent: 0,
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

    pub fn validate(&self, currency: Currency) -> Result<CaseProductFields, CommerceError> {
        Ok(CaseProductFields {
            title: validate_name("case title", &self.title)?,
            subtitle: self.subtitle.trim().to_string(),
            price: Money::parse(&self.price, currency)?,
            discount: Discount::new(self.discount_percent)?,
        })
    }
}

/// Validated case product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseProductFields {
    pub title: String,
    pub subtitle: String,
    pub price: Money,
    pub discount: Discount,
}
