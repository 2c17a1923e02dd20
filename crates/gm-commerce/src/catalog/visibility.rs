//! Visibility flags and list filtering.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entities that carry a visibility flag.
///
/// Products use `is_available`; everything else uses `is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    MainCategory,
    SubCategory,
    Product,
    CaseMainCategory,
    CasePhone,
    CaseModel,
    CaseProduct,
    CaseVariant,
    ModelMapping,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::MainCategory,
        EntityKind::SubCategory,
        EntityKind::Product,
        EntityKind::CaseMainCategory,
        EntityKind::CasePhone,
        EntityKind::CaseModel,
        EntityKind::CaseProduct,
        EntityKind::CaseVariant,
        EntityKind::ModelMapping,
    ];

    /// Human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::MainCategory => "Main category",
            EntityKind::SubCategory => "Sub category",
            EntityKind::Product => "Product",
            EntityKind::CaseMainCategory => "Case main category",
            EntityKind::CasePhone => "Case phone",
            EntityKind::CaseModel => "Case model",
            EntityKind::CaseProduct => "Case product",
            EntityKind::CaseVariant => "Case variant",
            EntityKind::ModelMapping => "Model mapping",
        }
    }

    /// Name of the flag field on the wire.
    pub fn flag_field(&self) -> &'static str {
        match self {
            EntityKind::Product => "is_available",
            _ => "is_active",
        }
    }

    /// Shorthand for a `NotFound` error about this kind.
    pub fn not_found(&self, id: impl ToString) -> CommerceError {
        CommerceError::not_found(self.label(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "main_category" => Ok(EntityKind::MainCategory),
            "sub_category" => Ok(EntityKind::SubCategory),
            "product" => Ok(EntityKind::Product),
            "case_main_category" => Ok(EntityKind::CaseMainCategory),
            "case_phone" => Ok(EntityKind::CasePhone),
            "case_model" => Ok(EntityKind::CaseModel),
            "case_product" => Ok(EntityKind::CaseProduct),
            "case_variant" => Ok(EntityKind::CaseVariant),
            "model_mapping" => Ok(EntityKind::ModelMapping),
            other => Err(CommerceError::invalid(format!(
                "unknown entity kind {other:?}"
            ))),
        }
    }
}

/// Filter applied by list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListFilter {
    /// Exclude entities whose own flag is off.
    pub active_only: bool,
}

impl ListFilter {
    /// Everything, as the admin screens see it.
    pub const ALL: ListFilter = ListFilter { active_only: false };
    /// Only entities whose flag is on.
    pub const ACTIVE: ListFilter = ListFilter { active_only: true };

    /// Whether an entity with the given flag passes.
    pub fn admits(&self, flag: bool) -> bool {
        flag || !self.active_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_admits() {
        assert!(ListFilter::ALL.admits(false));
        assert!(ListFilter::ALL.admits(true));
        assert!(!ListFilter::ACTIVE.admits(false));
        assert!(ListFilter::ACTIVE.admits(true));
    }

    #[test]
    fn test_kind_parse_and_flag() {
        for kind in EntityKind::ALL {
            let text = serde_json::to_value(kind).unwrap();
            let parsed: EntityKind = text.as_str().unwrap().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert_eq!(EntityKind::Product.flag_field(), "is_available");
        assert_eq!(EntityKind::CaseVariant.flag_field(), "is_active");
        assert!("order".parse::<EntityKind>().is_err());
    }
}
