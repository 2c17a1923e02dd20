//! In-memory catalog hierarchy.

use crate::cases::{CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseVariant, ModelMapping};
use crate::catalog::{
    validate_name, EntityKind, ImageRef, ListFilter, MainCategory, Product, ProductInput,
    SubCategory, TypeImages, VariantType,
};
use crate::error::CommerceError;
use crate::ids::{IdSequence, MainCategoryId, ProductId, SubCategoryId};
use crate::money::Currency;
use std::collections::BTreeMap;

/// The whole catalog held in memory: the product hierarchy and the
/// phone-case taxonomy.
///
/// Lists keep insertion order. Visibility flags are stored per entity and
/// never cascade; lists with [`ListFilter::ACTIVE`] additionally hide
/// anything under an inactive ancestor. Lists under a parent that does not
/// exist are empty. Mutations of a missing id fail with `NotFound`, and
/// input is validated before anything changes.
///
/// Operations that drop image references (deletes, replacements) return the
/// released references so the caller can free them in the image store.
///
/// # Example
///
/// ```rust,ignore
/// let mut catalog = Catalog::new(Currency::INR);
/// let audio = catalog.create_main_category("Audio", None)?;
/// let buds = catalog.create_sub_category(audio.id, "Earbuds", None)?;
/// let product = catalog.create_product(&ProductInput::new(buds.id, "Pods", "1499"))?;
/// catalog.set_type_image(product.id, VariantType::Type1, "white.png".into())?;
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) currency: Currency,
    pub(crate) ids: IdSequence,
    mains: Vec<MainCategory>,
    subs: Vec<SubCategory>,
    products: Vec<Product>,
    type_images: BTreeMap<ProductId, TypeImages>,
    pub(crate) case_mains: Vec<CaseMainCategory>,
    pub(crate) case_phones: Vec<CasePhone>,
    pub(crate) case_models: Vec<CaseModel>,
    pub(crate) case_products: Vec<CaseProduct>,
    pub(crate) case_variants: Vec<CaseVariant>,
    pub(crate) mappings: Vec<ModelMapping>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

impl Catalog {
    /// Create an empty catalog pricing in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            ids: IdSequence::new(),
            mains: Vec::new(),
            subs: Vec::new(),
            products: Vec::new(),
            type_images: BTreeMap::new(),
            case_mains: Vec::new(),
            case_phones: Vec::new(),
            case_models: Vec::new(),
            case_products: Vec::new(),
            case_variants: Vec::new(),
            mappings: Vec::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    // === Reads ===

    pub fn list_main_categories(&self, filter: ListFilter) -> Vec<MainCategory> {
        self.mains
            .iter()
            .filter(|m| filter.admits(m.is_active))
            .cloned()
            .collect()
    }

    pub fn list_sub_categories(
        &self,
        main_id: MainCategoryId,
        filter: ListFilter,
    ) -> Vec<SubCategory> {
        self.subs
            .iter()
            .filter(|s| s.main_category_id == main_id && self.sub_visible(s, filter))
            .cloned()
            .collect()
    }

    pub fn list_products(&self, sub_id: SubCategoryId, filter: ListFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.sub_category_id == sub_id && self.product_visible(p, filter))
            .map(|p| self.with_cover(p))
            .collect()
    }

    /// Every product regardless of category, as on the shop's browse page.
    pub fn list_all_products(&self, filter: ListFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| self.product_visible(p, filter))
            .map(|p| self.with_cover(p))
            .collect()
    }

    /// Type images for a product; empty when none were uploaded.
    pub fn get_type_images(&self, product_id: ProductId) -> TypeImages {
        self.type_images
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_main_category(&self, id: MainCategoryId) -> Result<&MainCategory, CommerceError> {
        self.mains
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| EntityKind::MainCategory.not_found(id))
    }

    pub fn get_sub_category(&self, id: SubCategoryId) -> Result<&SubCategory, CommerceError> {
        self.subs
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EntityKind::SubCategory.not_found(id))
    }

    pub fn get_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(|p| self.with_cover(p))
            .ok_or_else(|| EntityKind::Product.not_found(id))
    }

    fn sub_visible(&self, sub: &SubCategory, filter: ListFilter) -> bool {
        if !filter.active_only {
            return true;
        }
        sub.is_active
            && self
                .get_main_category(sub.main_category_id)
                .map(|m| m.is_active)
                .unwrap_or(false)
    }

    fn product_visible(&self, product: &Product, filter: ListFilter) -> bool {
        if !filter.active_only {
            return true;
        }
        product.is_available
            && self
                .get_sub_category(product.sub_category_id)
                .map(|s| self.sub_visible(s, filter))
                .unwrap_or(false)
    }

    fn with_cover(&self, product: &Product) -> Product {
        let mut product = product.clone();
        product.cover = self
            .type_images
            .get(&product.id)
            .and_then(|images| images.cover())
            .cloned();
        product
    }

    // === Main categories ===

    pub fn create_main_category(
        &mut self,
        name: &str,
        image: Option<ImageRef>,
    ) -> Result<MainCategory, CommerceError> {
        let name = validate_name("category name", name)?;
        let category = MainCategory::new(self.ids.next(), name, image);
        self.mains.push(category.clone());
        Ok(category)
    }

    /// Rename, and replace the image when one is given.
    pub fn update_main_category(
        &mut self,
        id: MainCategoryId,
        name: &str,
        image: Option<ImageRef>,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        let name = validate_name("category name", name)?;
        let category = self.main_mut(id)?;
        category.name = name;
        Ok(replace_image(&mut category.image, image))
    }

    pub fn remove_main_category_image(
        &mut self,
        id: MainCategoryId,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        Ok(self.main_mut(id)?.image.take().into_iter().collect())
    }

    /// Delete a main category with its sub categories and their products.
    pub fn delete_main_category(
        &mut self,
        id: MainCategoryId,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        let index = self
            .mains
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EntityKind::MainCategory.not_found(id))?;
        let category = self.mains.remove(index);

        let mut released: Vec<ImageRef> = category.image.into_iter().collect();
        let sub_ids: Vec<SubCategoryId> = self
            .subs
            .iter()
            .filter(|s| s.main_category_id == id)
            .map(|s| s.id)
            .collect();
        for sub_id in &sub_ids {
            released.extend(self.delete_sub_category(*sub_id)?);
        }
        tracing::debug!(%id, subs = sub_ids.len(), "deleted main category");
        Ok(released)
    }

    fn main_mut(&mut self, id: MainCategoryId) -> Result<&mut MainCategory, CommerceError> {
        self.mains
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| EntityKind::MainCategory.not_found(id))
    }

    // === Sub categories ===

    pub fn create_sub_category(
        &mut self,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageRef>,
    ) -> Result<SubCategory, CommerceError> {
        let name = validate_name("sub category name", name)?;
        self.get_main_category(main_id)?;
        let sub = SubCategory::new(self.ids.next(), main_id, name, image);
        self.subs.push(sub.clone());
        Ok(sub)
    }

    /// Rename, move under `main_id`, and replace the image when one is given.
    pub fn update_sub_category(
        &mut self,
        id: SubCategoryId,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageRef>,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        let name = validate_name("sub category name", name)?;
        self.get_main_category(main_id)?;
        let sub = self.sub_mut(id)?;
        sub.name = name;
        sub.main_category_id = main_id;
        Ok(replace_image(&mut sub.image, image))
    }

    pub fn remove_sub_category_image(
        &mut self,
        id: SubCategoryId,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        Ok(self.sub_mut(id)?.image.take().into_iter().collect())
    }

    /// Delete a sub category with its products.
    pub fn delete_sub_category(
        &mut self,
        id: SubCategoryId,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        let index = self
            .subs
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EntityKind::SubCategory.not_found(id))?;
        let sub = self.subs.remove(index);

        let mut released: Vec<ImageRef> = sub.image.into_iter().collect();
        let product_ids: Vec<ProductId> = self
            .products
            .iter()
            .filter(|p| p.sub_category_id == id)
            .map(|p| p.id)
            .collect();
        for product_id in product_ids {
            released.extend(self.delete_product(product_id)?);
        }
        Ok(released)
    }

    fn sub_mut(&mut self, id: SubCategoryId) -> Result<&mut SubCategory, CommerceError> {
        self.subs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EntityKind::SubCategory.not_found(id))
    }

    // === Products ===

    pub fn create_product(&mut self, input: &ProductInput) -> Result<Product, CommerceError> {
        let fields = input.validate(self.currency)?;
        self.get_sub_category(fields.sub_category_id)?;
        let product = Product {
            id: self.ids.next(),
            name: fields.name,
            subtitle: fields.subtitle,
            price: fields.price,
            discount: fields.discount,
            is_available: true,
            sub_category_id: fields.sub_category_id,
            cover: None,
        };
        self.products.push(product.clone());
        Ok(product)
    }

    pub fn update_product(
        &mut self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, CommerceError> {
        let fields = input.validate(self.currency)?;
        self.get_sub_category(fields.sub_category_id)?;
        let product = self.product_mut(id)?;
        product.name = fields.name;
        product.subtitle = fields.subtitle;
        product.price = fields.price;
        product.discount = fields.discount;
        product.sub_category_id = fields.sub_category_id;
        let product = product.clone();
        Ok(self.with_cover(&product))
    }

    /// Delete a product with its type images.
    pub fn delete_product(&mut self, id: ProductId) -> Result<Vec<ImageRef>, CommerceError> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EntityKind::Product.not_found(id))?;
        self.products.remove(index);
        Ok(self
            .type_images
            .remove(&id)
            .map(TypeImages::into_images)
            .unwrap_or_default())
    }

    fn product_mut(&mut self, id: ProductId) -> Result<&mut Product, CommerceError> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EntityKind::Product.not_found(id))
    }

    // === Type images ===

    /// Set the image for one type, replacing any existing one.
    pub fn set_type_image(
        &mut self,
        product_id: ProductId,
        variant: VariantType,
        image: ImageRef,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        self.product_mut(product_id)?;
        Ok(self
            .type_images
            .entry(product_id)
            .or_default()
            .set(variant, image)
            .into_iter()
            .collect())
    }

    /// Remove the image for one type. Removing an absent type is a no-op.
    pub fn delete_type_image(
        &mut self,
        product_id: ProductId,
        variant: VariantType,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        self.product_mut(product_id)?;
        let released = self
            .type_images
            .get_mut(&product_id)
            .and_then(|images| images.remove(variant));
        if self
            .type_images
            .get(&product_id)
            .is_some_and(TypeImages::is_empty)
        {
            self.type_images.remove(&product_id);
        }
        Ok(released.into_iter().collect())
    }

    // === Visibility ===

    /// Set exactly one entity's flag. Descendants keep their own flags.
    pub fn toggle_visibility(
        &mut self,
        kind: EntityKind,
        id: u64,
        value: bool,
    ) -> Result<(), CommerceError> {
        let flag = match kind {
            EntityKind::MainCategory => &mut self.main_mut(MainCategoryId::new(id))?.is_active,
            EntityKind::SubCategory => &mut self.sub_mut(SubCategoryId::new(id))?.is_active,
            EntityKind::Product => &mut self.product_mut(ProductId::new(id))?.is_available,
            _ => self.case_flag_mut(kind, id)?,
        };
        *flag = value;
        tracing::debug!(%kind, id, value, "visibility changed");
        Ok(())
    }
}

/// Swap in `new` if given, returning what was displaced.
fn replace_image(slot: &mut Option<ImageRef>, new: Option<ImageRef>) -> Vec<ImageRef> {
    match new {
        Some(image) => slot.replace(image).into_iter().collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        catalog: Catalog,
        main: MainCategoryId,
        sub: SubCategoryId,
        product: ProductId,
    }

    fn fixture() -> Fixture {
        let mut catalog = Catalog::new(Currency::INR);
        let main = catalog
            .create_main_category("Chargers", Some("main.png".into()))
            .unwrap()
            .id;
        let sub = catalog
            .create_sub_category(main, "Wall", Some("sub.png".into()))
            .unwrap()
            .id;
        let product = catalog
            .create_product(&ProductInput::new(sub, "20W Brick", "500").discount(10))
            .unwrap()
            .id;
        Fixture {
            catalog,
            main,
            sub,
            product,
        }
    }

    #[test]
    fn test_list_main_keeps_insertion_order() {
        let mut catalog = Catalog::default();
        for name in ["Zeta", "Alpha", "Mid"] {
            catalog.create_main_category(name, None).unwrap();
        }
        let names: Vec<_> = catalog
            .list_main_categories(ListFilter::ALL)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_active_only_excludes_inactive_main() {
        let mut f = fixture();
        let other = f.catalog.create_main_category("Cables", None).unwrap().id;
        f.catalog
            .toggle_visibility(EntityKind::MainCategory, other.get(), false)
            .unwrap();

        let active = f.catalog.list_main_categories(ListFilter::ACTIVE);
        assert!(active.iter().all(|m| m.id != other));
        assert_eq!(f.catalog.list_main_categories(ListFilter::ALL).len(), 2);
    }

    #[test]
    fn test_toggle_does_not_cascade_but_reads_recheck() {
        let mut f = fixture();
        f.catalog
            .toggle_visibility(EntityKind::MainCategory, f.main.get(), false)
            .unwrap();

        // Stored flags below are untouched.
        assert!(f.catalog.get_sub_category(f.sub).unwrap().is_active);
        assert!(f.catalog.get_product(f.product).unwrap().is_available);

        // Shopper reads hide the whole branch.
        assert!(f.catalog.list_sub_categories(f.main, ListFilter::ACTIVE).is_empty());
        assert!(f.catalog.list_products(f.sub, ListFilter::ACTIVE).is_empty());
        assert!(f.catalog.list_all_products(ListFilter::ACTIVE).is_empty());

        // Admin reads still see it.
        assert_eq!(f.catalog.list_products(f.sub, ListFilter::ALL).len(), 1);

        // Re-enabling restores the branch as it was.
        f.catalog
            .toggle_visibility(EntityKind::MainCategory, f.main.get(), true)
            .unwrap();
        assert_eq!(f.catalog.list_all_products(ListFilter::ACTIVE).len(), 1);
    }

    #[test]
    fn test_unavailable_product_hidden_from_shoppers() {
        let mut f = fixture();
        f.catalog
            .toggle_visibility(EntityKind::Product, f.product.get(), false)
            .unwrap();
        assert!(f.catalog.list_products(f.sub, ListFilter::ACTIVE).is_empty());
        assert!(!f.catalog.get_product(f.product).unwrap().is_available);
    }

    #[test]
    fn test_lists_under_missing_parent_are_empty() {
        let f = fixture();
        assert!(f
            .catalog
            .list_sub_categories(MainCategoryId::new(999), ListFilter::ALL)
            .is_empty());
        assert!(f
            .catalog
            .list_products(SubCategoryId::new(999), ListFilter::ALL)
            .is_empty());
        assert!(f.catalog.get_type_images(ProductId::new(999)).is_empty());
    }

    #[test]
    fn test_create_sub_with_empty_name_creates_nothing() {
        let mut f = fixture();
        let err = f.catalog.create_sub_category(f.main, "   ", None).unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
        assert_eq!(f.catalog.list_sub_categories(f.main, ListFilter::ALL).len(), 1);
    }

    #[test]
    fn test_orphans_rejected_at_write_time() {
        let mut f = fixture();
        let err = f
            .catalog
            .create_sub_category(MainCategoryId::new(999), "Loose", None)
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));

        let err = f
            .catalog
            .create_product(&ProductInput::new(SubCategoryId::new(999), "Loose", "1"))
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));

        let err = f
            .catalog
            .update_sub_category(f.sub, MainCategoryId::new(999), "Wall", None)
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[test]
    fn test_delete_missing_main_is_not_found() {
        let mut f = fixture();
        let err = f
            .catalog
            .delete_main_category(MainCategoryId::new(4242))
            .unwrap_err();
        assert_eq!(err, CommerceError::not_found("Main category", 4242));
    }

    #[test]
    fn test_delete_main_cascades_and_releases_images() {
        let mut f = fixture();
        f.catalog
            .set_type_image(f.product, VariantType::Type2, "t2.png".into())
            .unwrap();

        let mut released = f.catalog.delete_main_category(f.main).unwrap();
        released.sort();
        assert_eq!(
            released,
            vec![
                ImageRef::new("main.png"),
                ImageRef::new("sub.png"),
                ImageRef::new("t2.png")
            ]
        );
        assert!(f.catalog.get_sub_category(f.sub).is_err());
        assert!(f.catalog.get_product(f.product).is_err());
        assert!(f.catalog.get_type_images(f.product).is_empty());
    }

    #[test]
    fn test_type_image_round_trip() {
        let mut f = fixture();
        f.catalog
            .set_type_image(f.product, VariantType::Type3, "img.png".into())
            .unwrap();
        let images = f.catalog.get_type_images(f.product);
        assert_eq!(images.get(VariantType::Type3), Some(&ImageRef::new("img.png")));

        let released = f
            .catalog
            .delete_type_image(f.product, VariantType::Type3)
            .unwrap();
        assert_eq!(released, vec![ImageRef::new("img.png")]);
        assert!(!f.catalog.get_type_images(f.product).contains(VariantType::Type3));

        // Absent type: no-op.
        assert!(f
            .catalog
            .delete_type_image(f.product, VariantType::Type3)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_set_type_image_replaces() {
        let mut f = fixture();
        f.catalog
            .set_type_image(f.product, VariantType::Type1, "a.png".into())
            .unwrap();
        let released = f
            .catalog
            .set_type_image(f.product, VariantType::Type1, "b.png".into())
            .unwrap();
        assert_eq!(released, vec![ImageRef::new("a.png")]);
        assert_eq!(
            f.catalog.get_product(f.product).unwrap().cover,
            Some(ImageRef::new("b.png"))
        );
    }

    #[test]
    fn test_type_image_on_missing_product() {
        let mut f = fixture();
        let err = f
            .catalog
            .set_type_image(ProductId::new(999), VariantType::Type1, "x.png".into())
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[test]
    fn test_update_main_replaces_image_only_when_given() {
        let mut f = fixture();
        assert!(f
            .catalog
            .update_main_category(f.main, "Power", None)
            .unwrap()
            .is_empty());
        assert_eq!(
            f.catalog.get_main_category(f.main).unwrap().image,
            Some(ImageRef::new("main.png"))
        );

        let released = f
            .catalog
            .update_main_category(f.main, "Power", Some("new.png".into()))
            .unwrap();
        assert_eq!(released, vec![ImageRef::new("main.png")]);
        assert_eq!(f.catalog.get_main_category(f.main).unwrap().name, "Power");

        let released = f.catalog.remove_main_category_image(f.main).unwrap();
        assert_eq!(released, vec![ImageRef::new("new.png")]);
        assert!(f.catalog.get_main_category(f.main).unwrap().image.is_none());
    }

    #[test]
    fn test_update_product_validates_first() {
        let mut f = fixture();
        let bad = ProductInput::new(f.sub, "Brick", "lots");
        assert!(f.catalog.update_product(f.product, &bad).is_err());
        assert_eq!(f.catalog.get_product(f.product).unwrap().name, "20W Brick");

        let good = ProductInput::new(f.sub, "30W Brick", "650").discount(5);
        let updated = f.catalog.update_product(f.product, &good).unwrap();
        assert_eq!(updated.name, "30W Brick");
        assert_eq!(updated.effective_price().display_amount(), "617.50");
    }

    #[test]
    fn test_toggle_missing_is_not_found() {
        let mut f = fixture();
        let err = f
            .catalog
            .toggle_visibility(EntityKind::SubCategory, 999, false)
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }
}
