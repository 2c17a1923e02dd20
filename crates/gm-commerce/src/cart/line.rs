//! Cart lines and the drafts they are built from.

use crate::cases::{find_allowed, AllowedModel, CaseProduct};
use crate::catalog::{ImageRef, Product, TypeImages, VariantType};
use crate::error::CommerceError;
use crate::ids::{CaseModelId, CaseProductId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// What a cart line is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRef {
    /// A catalog product.
    Product { product_id: ProductId },
    /// A case design for one device model.
    Case {
        case_product_id: CaseProductId,
        model_id: CaseModelId,
    },
}

impl ItemRef {
    pub fn product(id: ProductId) -> Self {
        ItemRef::Product { product_id: id }
    }

    pub fn case(case_product_id: CaseProductId, model_id: CaseModelId) -> Self {
        ItemRef::Case {
            case_product_id,
            model_id,
        }
    }

    /// The catalog product id, `None` for case items.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            ItemRef::Product { product_id } => Some(*product_id),
            ItemRef::Case { .. } => None,
        }
    }
}

/// Identity of a cart line. Same item with a different type is a different
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CartKey {
    pub item: ItemRef,
    pub selected_type: Option<VariantType>,
}

impl CartKey {
    pub fn new(item: ItemRef, selected_type: Option<VariantType>) -> Self {
        Self {
            item,
            selected_type,
        }
    }
}

/// Which store a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    Guest,
    Server,
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub item: ItemRef,
    pub selected_type: Option<VariantType>,
    /// Display name, denormalized at add time.
    pub name: String,
    pub image: Option<ImageRef>,
    /// Effective price when the line was first added.
    pub unit_price_at_add: Money,
    /// Always at least 1.
    pub quantity: u32,
    pub source: LineSource,
}

impl CartLine {
    pub fn key(&self) -> CartKey {
        CartKey::new(self.item, self.selected_type)
    }

    /// `unit_price_at_add × quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price_at_add
            .try_multiply(i64::from(self.quantity))
            .ok_or(CommerceError::Overflow)
    }
}

/// A validated request to put something in the cart.
///
/// Drafts snapshot the name, image and effective price at the moment the
/// shopper adds the item.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDraft {
    pub item: ItemRef,
    pub selected_type: Option<VariantType>,
    pub name: String,
    pub image: Option<ImageRef>,
    pub unit_price: Money,
}

impl LineDraft {
    /// Draft for a catalog product.
    ///
    /// A product with type images needs a selected type, and the selected
    /// type must have an image.
    pub fn for_product(
        product: &Product,
        images: &TypeImages,
        selected: Option<VariantType>,
    ) -> Result<Self, CommerceError> {
        let image = select_image(&product.name, images, selected)?
            .or_else(|| product.cover.clone());
        Ok(Self {
            item: ItemRef::product(product.id),
            selected_type: selected,
            name: product.name.clone(),
            image,
            unit_price: product.effective_price(),
        })
    }

    /// Draft for a case product fitted to `model_id`.
    ///
    /// The model must be one of the product's allowed models.
    pub fn for_case(
        product: &CaseProduct,
        variants: &TypeImages,
        allowed: &[AllowedModel],
        model_id: CaseModelId,
        selected: Option<VariantType>,
    ) -> Result<Self, CommerceError> {
        let model = find_allowed(allowed, model_id).ok_or_else(|| {
            CommerceError::invalid(format!(
                "model {model_id} is not available for {}",
                product.title
            ))
        })?;
        let image = select_image(&product.title, variants, selected)?;
        Ok(Self {
            item: ItemRef::case(product.id, model_id),
            selected_type: selected,
            name: format!("{} ({})", product.title, model.label()),
            image,
            unit_price: product.effective_price(),
        })
    }

    pub fn key(&self) -> CartKey {
        CartKey::new(self.item, self.selected_type)
    }
}

fn select_image(
    name: &str,
    images: &TypeImages,
    selected: Option<VariantType>,
) -> Result<Option<ImageRef>, CommerceError> {
    match selected {
        Some(t) => images.get(t).cloned().map(Some).ok_or_else(|| {
            CommerceError::invalid(format!("{name} has no image for {t}"))
        }),
        None if !images.is_empty() => Err(CommerceError::invalid(format!(
            "select a type for {name}"
        ))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Discount;
    use crate::ids::{CaseMainCategoryId, CasePhoneId, ModelMappingId, SubCategoryId};
    use crate::money::Currency;

    fn product() -> Product {
        Product {
            id: ProductId::new(3),
            name: "Cable".into(),
            subtitle: String::new(),
            price: Money::new(20000, Currency::INR),
            discount: Discount::new(10).unwrap(),
            is_available: true,
            sub_category_id: SubCategoryId::new(2),
            cover: None,
        }
    }

    fn images() -> TypeImages {
        [
            (VariantType::Type1, ImageRef::new("black.png")),
            (VariantType::Type2, ImageRef::new("white.png")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_product_draft_requires_type_when_images_exist() {
        let err = LineDraft::for_product(&product(), &images(), None).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));

        let err =
            LineDraft::for_product(&product(), &images(), Some(VariantType::Type4)).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
    }

    #[test]
    fn test_product_draft_snapshots_price_and_image() {
        let draft =
            LineDraft::for_product(&product(), &images(), Some(VariantType::Type2)).unwrap();
        assert_eq!(draft.unit_price, Money::new(18000, Currency::INR));
        assert_eq!(draft.image, Some(ImageRef::new("white.png")));
        assert_eq!(draft.key().item, ItemRef::product(ProductId::new(3)));
    }

    #[test]
    fn test_untyped_product_draft() {
        let draft = LineDraft::for_product(&product(), &TypeImages::new(), None).unwrap();
        assert_eq!(draft.selected_type, None);
        assert_eq!(draft.image, None);
    }

    #[test]
    fn test_case_draft_checks_model() {
        let case = CaseProduct {
            id: CaseProductId::new(9),
            title: "Armor".into(),
            subtitle: String::new(),
            price: Money::new(79900, Currency::INR),
            discount: Discount::NONE,
            is_active: true,
        };
        let allowed = vec![AllowedModel {
            mapping_id: ModelMappingId::new(1),
            main_category_id: CaseMainCategoryId::new(1),
            phone_id: CasePhoneId::new(2),
            model_id: CaseModelId::new(3),
            main_name: "iPhone".into(),
            phone_name: "iPhone 15".into(),
            model_name: "15 Pro".into(),
        }];

        let draft = LineDraft::for_case(
            &case,
            &images(),
            &allowed,
            CaseModelId::new(3),
            Some(VariantType::Type1),
        )
        .unwrap();
        assert_eq!(draft.name, "Armor (iPhone 15 / 15 Pro)");
        assert_eq!(
            draft.item,
            ItemRef::case(CaseProductId::new(9), CaseModelId::new(3))
        );

        let err = LineDraft::for_case(
            &case,
            &images(),
            &allowed,
            CaseModelId::new(4),
            Some(VariantType::Type1),
        )
        .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
    }
}
