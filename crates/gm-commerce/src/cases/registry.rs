//! Phone-case operations on the in-memory [`Catalog`].

use crate::cases::{
    AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductInput,
    CaseVariant, ModelMapping,
};
use crate::catalog::{validate_name, Catalog, EntityKind, ImageRef, ListFilter, TypeImages, VariantType};
use crate::error::CommerceError;
use crate::ids::{
    CaseMainCategoryId, CaseModelId, CasePhoneId, CaseProductId, CaseVariantId, ModelMappingId,
};

impl Catalog {
    // === Reads ===

    pub fn list_case_main_categories(&self, filter: ListFilter) -> Vec<CaseMainCategory> {
        self.case_mains
            .iter()
            .filter(|m| filter.admits(m.is_active))
            .cloned()
            .collect()
    }

    pub fn list_phones(&self, main_id: CaseMainCategoryId, filter: ListFilter) -> Vec<CasePhone> {
        self.case_phones
            .iter()
            .filter(|p| p.main_category_id == main_id && self.phone_visible(p, filter))
            .cloned()
            .collect()
    }

    pub fn list_models(&self, phone_id: CasePhoneId, filter: ListFilter) -> Vec<CaseModel> {
        self.case_models
            .iter()
            .filter(|m| m.phone_id == phone_id && self.model_visible(m, filter))
            .cloned()
            .collect()
    }

    pub fn list_case_products(&self, filter: ListFilter) -> Vec<CaseProduct> {
        self.case_products
            .iter()
            .filter(|p| filter.admits(p.is_active))
            .cloned()
            .collect()
    }

    /// Variants of a case product. Active-only also requires the product
    /// to be active.
    pub fn list_variants(
        &self,
        case_product_id: CaseProductId,
        filter: ListFilter,
    ) -> Vec<CaseVariant> {
        if filter.active_only
            && !self
                .get_case_product(case_product_id)
                .map(|p| p.is_active)
                .unwrap_or(false)
        {
            return Vec::new();
        }
        self.case_variants
            .iter()
            .filter(|v| v.case_product_id == case_product_id && filter.admits(v.is_active))
            .cloned()
            .collect()
    }

    /// Shopper view of a case product's variants as a type → image map.
    pub fn case_variant_images(&self, case_product_id: CaseProductId) -> TypeImages {
        self.list_variants(case_product_id, ListFilter::ACTIVE)
            .into_iter()
            .map(|v| (v.variant_type, v.image))
            .collect()
    }

    /// Admin view of the compatibility table for one case product.
    pub fn list_model_mappings(&self, case_product_id: CaseProductId) -> Vec<ModelMapping> {
        self.mappings
            .iter()
            .filter(|m| m.case_product_id == case_product_id)
            .cloned()
            .collect()
    }

    /// Models a shopper may pick: the mapping and its main category, phone
    /// and model must all be active.
    pub fn list_allowed_models(&self, case_product_id: CaseProductId) -> Vec<AllowedModel> {
        self.mappings
            .iter()
            .filter(|m| m.case_product_id == case_product_id && m.is_active)
            .filter_map(|m| self.allowed(m))
            .collect()
    }

    /// Active case products with an allowed mapping to `model_id`.
    pub fn list_case_products_for_model(&self, model_id: CaseModelId) -> Vec<CaseProduct> {
        self.case_products
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| {
                self.mappings.iter().any(|m| {
                    m.case_product_id == p.id
                        && m.model_id == model_id
                        && m.is_active
                        && self.allowed(m).is_some()
                })
            })
            .cloned()
            .collect()
    }

    /// Variants of every case product sold for `model_id`.
    pub fn list_variants_for_model(
        &self,
        model_id: CaseModelId,
        filter: ListFilter,
    ) -> Vec<CaseVariant> {
        self.list_case_products_for_model(model_id)
            .into_iter()
            .flat_map(|p| self.list_variants(p.id, filter))
            .collect()
    }

    pub fn get_case_product(&self, id: CaseProductId) -> Result<&CaseProduct, CommerceError> {
        self.case_products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EntityKind::CaseProduct.not_found(id))
    }

    fn allowed(&self, mapping: &ModelMapping) -> Option<AllowedModel> {
        let main = self.case_mains.iter().find(|x| x.id == mapping.main_category_id)?;
        let phone = self.case_phones.iter().find(|x| x.id == mapping.phone_id)?;
        let model = self.case_models.iter().find(|x| x.id == mapping.model_id)?;
        if !(main.is_active && phone.is_active && model.is_active) {
            return None;
        }
        Some(AllowedModel {
            mapping_id: mapping.id,
            main_category_id: main.id,
            phone_id: phone.id,
            model_id: model.id,
            main_name: main.name.clone(),
            phone_name: phone.name.clone(),
            model_name: model.name.clone(),
        })
    }

    fn phone_visible(&self, phone: &CasePhone, filter: ListFilter) -> bool {
        if !filter.active_only {
            return true;
        }
        phone.is_active
            && self
                .case_mains
                .iter()
                .any(|m| m.id == phone.main_category_id && m.is_active)
    }

    fn model_visible(&self, model: &CaseModel, filter: ListFilter) -> bool {
        if !filter.active_only {
            return true;
        }
        model.is_active
            && self
                .case_phones
                .iter()
                .any(|p| p.id == model.phone_id && self.phone_visible(p, filter))
    }

    // === Case main categories ===

    pub fn create_case_main_category(
        &mut self,
        name: &str,
    ) -> Result<CaseMainCategory, CommerceError> {
        let name = validate_name("case category name", name)?;
        let category = CaseMainCategory {
            id: self.ids.next(),
            name,
            is_active: true,
        };
        self.case_mains.push(category.clone());
        Ok(category)
    }

    pub fn update_case_main_category(
        &mut self,
        id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("case category name", name)?;
        self.case_main_mut(id)?.name = name;
        Ok(())
    }

    /// Delete a case main category with its phones, models and their mappings.
    pub fn delete_case_main_category(&mut self, id: CaseMainCategoryId) -> Result<(), CommerceError> {
        self.case_main_mut(id)?;
        self.case_mains.retain(|m| m.id != id);
        let phones: Vec<CasePhoneId> = self
            .case_phones
            .iter()
            .filter(|p| p.main_category_id == id)
            .map(|p| p.id)
            .collect();
        for phone in phones {
            self.delete_phone(phone)?;
        }
        self.mappings.retain(|m| m.main_category_id != id);
        Ok(())
    }

    fn case_main_mut(
        &mut self,
        id: CaseMainCategoryId,
    ) -> Result<&mut CaseMainCategory, CommerceError> {
        self.case_mains
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| EntityKind::CaseMainCategory.not_found(id))
    }

    // === Phones ===

    pub fn create_phone(
        &mut self,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<CasePhone, CommerceError> {
        let name = validate_name("phone name", name)?;
        self.case_main_mut(main_id)?;
        let phone = CasePhone {
            id: self.ids.next(),
            name,
            main_category_id: main_id,
            is_active: true,
        };
        self.case_phones.push(phone.clone());
        Ok(phone)
    }

    pub fn update_phone(
        &mut self,
        id: CasePhoneId,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("phone name", name)?;
        self.case_main_mut(main_id)?;
        let phone = self.phone_mut(id)?;
        phone.name = name;
        phone.main_category_id = main_id;
        Ok(())
    }

    /// Delete a phone with its models and their mappings.
    pub fn delete_phone(&mut self, id: CasePhoneId) -> Result<(), CommerceError> {
        self.phone_mut(id)?;
        self.case_phones.retain(|p| p.id != id);
        let models: Vec<CaseModelId> = self
            .case_models
            .iter()
            .filter(|m| m.phone_id == id)
            .map(|m| m.id)
            .collect();
        for model in models {
            self.delete_model(model)?;
        }
        self.mappings.retain(|m| m.phone_id != id);
        Ok(())
    }

    fn phone_mut(&mut self, id: CasePhoneId) -> Result<&mut CasePhone, CommerceError> {
        self.case_phones
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EntityKind::CasePhone.not_found(id))
    }

    // === Models ===

    pub fn create_model(
        &mut self,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<CaseModel, CommerceError> {
        let name = validate_name("model name", name)?;
        self.phone_mut(phone_id)?;
        let model = CaseModel {
            id: self.ids.next(),
            name,
            phone_id,
            is_active: true,
        };
        self.case_models.push(model.clone());
        Ok(model)
    }

    pub fn update_model(
        &mut self,
        id: CaseModelId,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("model name", name)?;
        self.phone_mut(phone_id)?;
        let model = self.model_mut(id)?;
        model.name = name;
        model.phone_id = phone_id;
        Ok(())
    }

    /// Delete a model and the mappings that point at it.
    pub fn delete_model(&mut self, id: CaseModelId) -> Result<(), CommerceError> {
        self.model_mut(id)?;
        self.case_models.retain(|m| m.id != id);
        self.mappings.retain(|m| m.model_id != id);
        Ok(())
    }

    fn model_mut(&mut self, id: CaseModelId) -> Result<&mut CaseModel, CommerceError> {
        self.case_models
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| EntityKind::CaseModel.not_found(id))
    }

    // === Case products ===

    pub fn create_case_product(
        &mut self,
        input: &CaseProductInput,
    ) -> Result<CaseProduct, CommerceError> {
        let fields = input.validate(self.currency)?;
        let product = CaseProduct {
            id: self.ids.next(),
            title: fields.title,
            subtitle: fields.subtitle,
            price: fields.price,
            discount: fields.discount,
            is_active: true,
        };
        self.case_products.push(product.clone());
        Ok(product)
    }

    pub fn update_case_product(
        &mut self,
        id: CaseProductId,
        input: &CaseProductInput,
    ) -> Result<CaseProduct, CommerceError> {
        let fields = input.validate(self.currency)?;
        let product = self.case_product_mut(id)?;
        product.title = fields.title;
        product.subtitle = fields.subtitle;
        product.price = fields.price;
        product.discount = fields.discount;
        Ok(product.clone())
    }

    /// Delete a case product with its variants and mappings.
    pub fn delete_case_product(
        &mut self,
        id: CaseProductId,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        self.case_product_mut(id)?;
        self.case_products.retain(|p| p.id != id);
        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.case_variants)
            .into_iter()
            .partition(|v| v.case_product_id == id);
        self.case_variants = kept;
        self.mappings.retain(|m| m.case_product_id != id);
        tracing::debug!(%id, variants = dropped.len(), "deleted case product");
        Ok(dropped.into_iter().map(|v| v.image).collect())
    }

    fn case_product_mut(&mut self, id: CaseProductId) -> Result<&mut CaseProduct, CommerceError> {
        self.case_products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EntityKind::CaseProduct.not_found(id))
    }

    // === Variants ===

    /// Upload the image for one variant slot, replacing any existing variant.
    ///
    /// Returns the new variant and the image it displaced, if any.
    pub fn set_case_variant(
        &mut self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
        image: ImageRef,
    ) -> Result<(CaseVariant, Option<ImageRef>), CommerceError> {
        self.case_product_mut(case_product_id)?;
        let old = self
            .case_variants
            .iter()
            .position(|v| v.case_product_id == case_product_id && v.variant_type == variant_type)
            .map(|i| self.case_variants.remove(i).image);
        let variant = CaseVariant {
            id: self.ids.next(),
            case_product_id,
            variant_type,
            image,
            is_active: true,
        };
        self.case_variants.push(variant.clone());
        Ok((variant, old))
    }

    pub fn delete_case_variant(
        &mut self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
    ) -> Result<Vec<ImageRef>, CommerceError> {
        let index = self
            .case_variants
            .iter()
            .position(|v| v.case_product_id == case_product_id && v.variant_type == variant_type)
            .ok_or_else(|| {
                EntityKind::CaseVariant.not_found(format!("{case_product_id}/{variant_type}"))
            })?;
        Ok(vec![self.case_variants.remove(index).image])
    }

    // === Compatibility ===

    /// Allow `case_product_id` for a model. Mapping an already mapped model
    /// returns the existing row unchanged.
    pub fn map_model(
        &mut self,
        case_product_id: CaseProductId,
        main_id: CaseMainCategoryId,
        phone_id: CasePhoneId,
        model_id: CaseModelId,
    ) -> Result<ModelMapping, CommerceError> {
        self.case_product_mut(case_product_id)?;
        let phone = self.phone_mut(phone_id)?;
        if phone.main_category_id != main_id {
            return Err(CommerceError::invalid(format!(
                "phone {phone_id} is not under case category {main_id}"
            )));
        }
        self.case_main_mut(main_id)?;
        let model = self.model_mut(model_id)?;
        if model.phone_id != phone_id {
            return Err(CommerceError::invalid(format!(
                "model {model_id} is not under phone {phone_id}"
            )));
        }

        if let Some(existing) = self
            .mappings
            .iter()
            .find(|m| m.case_product_id == case_product_id && m.model_id == model_id)
        {
            return Ok(existing.clone());
        }

        let mapping = ModelMapping {
            id: self.ids.next(),
            case_product_id,
            main_category_id: main_id,
            phone_id,
            model_id,
            is_active: true,
        };
        self.mappings.push(mapping.clone());
        Ok(mapping)
    }

    pub(crate) fn case_flag_mut(
        &mut self,
        kind: EntityKind,
        id: u64,
    ) -> Result<&mut bool, CommerceError> {
        let flag = match kind {
            EntityKind::CaseMainCategory => {
                &mut self.case_main_mut(CaseMainCategoryId::new(id))?.is_active
            }
            EntityKind::CasePhone => &mut self.phone_mut(CasePhoneId::new(id))?.is_active,
            EntityKind::CaseModel => &mut self.model_mut(CaseModelId::new(id))?.is_active,
            EntityKind::CaseProduct => {
                &mut self.case_product_mut(CaseProductId::new(id))?.is_active
            }
            EntityKind::CaseVariant => {
                let id = CaseVariantId::new(id);
                &mut self
                    .case_variants
                    .iter_mut()
                    .find(|v| v.id == id)
                    .ok_or_else(|| EntityKind::CaseVariant.not_found(id))?
                    .is_active
            }
            EntityKind::ModelMapping => {
                let id = ModelMappingId::new(id);
                &mut self
                    .mappings
                    .iter_mut()
                    .find(|m| m.id == id)
                    .ok_or_else(|| EntityKind::ModelMapping.not_found(id))?
                    .is_active
            }
            EntityKind::MainCategory | EntityKind::SubCategory | EntityKind::Product => {
                return Err(CommerceError::invalid(format!("{kind} is not a case entity")))
            }
        };
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    struct Cases {
        catalog: Catalog,
        apple: CaseMainCategoryId,
        iphone15: CasePhoneId,
        pro: CaseModelId,
        plus: CaseModelId,
        armor: CaseProductId,
    }

    fn cases() -> Cases {
        let mut catalog = Catalog::new(Currency::INR);
        let apple = catalog.create_case_main_category("iPhone").unwrap().id;
        let iphone15 = catalog.create_phone(apple, "iPhone 15").unwrap().id;
        let pro = catalog.create_model(iphone15, "15 Pro").unwrap().id;
        let plus = catalog.create_model(iphone15, "15 Plus").unwrap().id;
        let armor = catalog
            .create_case_product(&CaseProductInput::new("Armor", "799").discount(25))
            .unwrap()
            .id;
        catalog.map_model(armor, apple, iphone15, pro).unwrap();
        Cases {
            catalog,
            apple,
            iphone15,
            pro,
            plus,
            armor,
        }
    }

    #[test]
    fn test_allowed_models_projection() {
        let c = cases();
        let allowed = c.catalog.list_allowed_models(c.armor);
        assert_eq!(allowed.len(), 1);
        assert_eq!(allowed[0].model_id, c.pro);
        assert_eq!(allowed[0].main_name, "iPhone");
        assert_eq!(allowed[0].label(), "iPhone 15 / 15 Pro");
    }

    #[test]
    fn test_map_model_is_idempotent() {
        let mut c = cases();
        let again = c.catalog.map_model(c.armor, c.apple, c.iphone15, c.pro).unwrap();
        assert_eq!(c.catalog.list_model_mappings(c.armor).len(), 1);
        assert_eq!(again.model_id, c.pro);
    }

    #[test]
    fn test_map_model_rejects_broken_chain() {
        let mut c = cases();
        let other_main = c.catalog.create_case_main_category("Galaxy").unwrap().id;
        let err = c
            .catalog
            .map_model(c.armor, other_main, c.iphone15, c.plus)
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));

        let err = c
            .catalog
            .map_model(CaseProductId::new(999), c.apple, c.iphone15, c.plus)
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[test]
    fn test_allowed_models_recheck_every_level() {
        for kind in [
            EntityKind::ModelMapping,
            EntityKind::CaseMainCategory,
            EntityKind::CasePhone,
            EntityKind::CaseModel,
        ] {
            let mut c = cases();
            let id = match kind {
                EntityKind::ModelMapping => c.catalog.list_model_mappings(c.armor)[0].id.get(),
                EntityKind::CaseMainCategory => c.apple.get(),
                EntityKind::CasePhone => c.iphone15.get(),
                _ => c.pro.get(),
            };
            c.catalog.toggle_visibility(kind, id, false).unwrap();
            assert!(
                c.catalog.list_allowed_models(c.armor).is_empty(),
                "{kind} off should hide the model"
            );
            assert!(c.catalog.list_case_products_for_model(c.pro).is_empty());
        }
    }

    #[test]
    fn test_phone_and_model_lists_recheck_ancestors() {
        let mut c = cases();
        c.catalog
            .toggle_visibility(EntityKind::CaseMainCategory, c.apple.get(), false)
            .unwrap();
        assert!(c.catalog.list_phones(c.apple, ListFilter::ACTIVE).is_empty());
        assert!(c.catalog.list_models(c.iphone15, ListFilter::ACTIVE).is_empty());
        assert_eq!(c.catalog.list_models(c.iphone15, ListFilter::ALL).len(), 2);
    }

    #[test]
    fn test_variants_replace_and_filter() {
        let mut c = cases();
        c.catalog
            .set_case_variant(c.armor, VariantType::Type1, "black.png".into())
            .unwrap();
        let (v2, old) = c
            .catalog
            .set_case_variant(c.armor, VariantType::Type1, "black2.png".into())
            .unwrap();
        assert_eq!(old, Some(ImageRef::new("black.png")));
        c.catalog
            .set_case_variant(c.armor, VariantType::Type2, "blue.png".into())
            .unwrap();
        c.catalog
            .toggle_visibility(EntityKind::CaseVariant, v2.id.get(), false)
            .unwrap();

        assert_eq!(c.catalog.list_variants(c.armor, ListFilter::ALL).len(), 2);
        let shop = c.catalog.case_variant_images(c.armor);
        assert_eq!(shop.types().collect::<Vec<_>>(), vec![VariantType::Type2]);

        assert_eq!(
            c.catalog.list_variants_for_model(c.pro, ListFilter::ALL).len(),
            2
        );
        assert!(c
            .catalog
            .list_variants_for_model(c.plus, ListFilter::ALL)
            .is_empty());
    }

    #[test]
    fn test_delete_case_variant_missing_is_not_found() {
        let mut c = cases();
        let err = c
            .catalog
            .delete_case_variant(c.armor, VariantType::Type5)
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[test]
    fn test_delete_phone_cascades() {
        let mut c = cases();
        c.catalog.delete_phone(c.iphone15).unwrap();
        assert!(c.catalog.list_models(c.iphone15, ListFilter::ALL).is_empty());
        assert!(c.catalog.list_model_mappings(c.armor).is_empty());
        assert!(c.catalog.list_allowed_models(c.armor).is_empty());
    }

    #[test]
    fn test_delete_case_product_releases_variant_images() {
        let mut c = cases();
        c.catalog
            .set_case_variant(c.armor, VariantType::Type3, "red.png".into())
            .unwrap();
        let released = c.catalog.delete_case_product(c.armor).unwrap();
        assert_eq!(released, vec![ImageRef::new("red.png")]);
        assert!(c.catalog.list_model_mappings(c.armor).is_empty());
        assert!(c.catalog.get_case_product(c.armor).is_err());
    }

    #[test]
    fn test_case_product_list_and_toggle() {
        let mut c = cases();
        c.catalog
            .toggle_visibility(EntityKind::CaseProduct, c.armor.get(), false)
            .unwrap();
        assert!(c.catalog.list_case_products(ListFilter::ACTIVE).is_empty());
        assert_eq!(c.catalog.list_case_products(ListFilter::ALL).len(), 1);
        assert!(c.catalog.case_variant_images(c.armor).is_empty());
    }

    #[test]
    fn test_create_phone_requires_parent_and_name() {
        let mut c = cases();
        assert!(matches!(
            c.catalog.create_phone(CaseMainCategoryId::new(999), "X"),
            Err(CommerceError::NotFound { .. })
        ));
        assert!(matches!(
            c.catalog.create_phone(c.apple, ""),
            Err(CommerceError::InvalidArgument(_))
        ));
    }
}
