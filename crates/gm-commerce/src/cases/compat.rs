//! Which device models a case product fits.

use crate::ids::{CaseMainCategoryId, CaseModelId, CasePhoneId, CaseProductId, ModelMappingId};
use serde::{Deserialize, Serialize};

/// One row of the case product ↔ model compatibility table.
///
/// At most one mapping exists per `(case product, model)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMapping {
    pub id: ModelMappingId,
    pub case_product_id: CaseProductId,
    pub main_category_id: CaseMainCategoryId,
    pub phone_id: CasePhoneId,
    pub model_id: CaseModelId,
    pub is_active: bool,
}

/// A model a shopper may pick for a case product, with display names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowedModel {
    pub mapping_id: ModelMappingId,
    pub main_category_id: CaseMainCategoryId,
    pub phone_id: CasePhoneId,
    pub model_id: CaseModelId,
    pub main_name: String,
    pub phone_name: String,
    pub model_name: String,
}

impl AllowedModel {
    /// "iPhone 15 / iPhone 15 Pro" style label.
    pub fn label(&self) -> String {
        format!("{} / {}", self.phone_name, self.model_name)
    }
}

/// Find `model_id` among the allowed models.
pub fn find_allowed(allowed: &[AllowedModel], model_id: CaseModelId) -> Option<&AllowedModel> {
    allowed.iter().find(|m| m.model_id == model_id)
}
