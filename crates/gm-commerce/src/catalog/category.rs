//! Main and sub categories.

use crate::catalog::ImageRef;
use crate::ids::{MainCategoryId, SubCategoryId};
use serde::{Deserialize, Serialize};

/// Root of one catalog branch, e.g. "Chargers".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainCategory {
    pub id: MainCategoryId,
    pub name: String,
    pub image: Option<ImageRef>,
    pub is_active: bool,
}

impl MainCategory {
    /// Create an active category.
    pub fn new(id: MainCategoryId, name: impl Into<String>, image: Option<ImageRef>) -> Self {
        Self {
            id,
            name: name.into(),
            image,
            is_active: true,
        }
    }
}

/// A category under exactly one [`MainCategory`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub name: String,
    pub image: Option<ImageRef>,
    pub is_active: bool,
    pub main_category_id: MainCategoryId,
}

impl SubCategory {
    /// Create an active sub category.
    pub fn new(
        id: SubCategoryId,
        main_category_id: MainCategoryId,
        name: impl Into<String>,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image,
            is_active: true,
            main_category_id,
        }
    }
}
