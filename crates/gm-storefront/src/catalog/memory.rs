//! In-process catalog store.

use super::CatalogStore;
use crate::images::{ImageFolder, ImageStore};
use async_trait::async_trait;
use gm_commerce::cases::{
    AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductInput,
    CaseVariant, ModelMapping,
};
use gm_commerce::catalog::{
    validate_name, Catalog, EntityKind, ImageRef, ImageUpload, ListFilter, MainCategory, Product,
    ProductInput, SubCategory, TypeImages, VariantType,
};
use gm_commerce::ids::*;
use gm_commerce::{CommerceError, Currency};
use std::cell::RefCell;
use std::rc::Rc;

/// A [`Catalog`] behind the async store interface, with uploads going to
/// an [`ImageStore`].
///
/// Uploads are stored only after the input checks out. Images dropped by a
/// replace or delete are released afterwards; a failed release is logged
/// and does not fail the operation.
pub struct MemoryCatalog {
    catalog: RefCell<Catalog>,
    images: Rc<dyn ImageStore>,
}

impl MemoryCatalog {
    pub fn new(currency: Currency, images: Rc<dyn ImageStore>) -> Self {
        Self::from_catalog(Catalog::new(currency), images)
    }

    pub fn from_catalog(catalog: Catalog, images: Rc<dyn ImageStore>) -> Self {
        Self {
            catalog: RefCell::new(catalog),
            images,
        }
    }

    /// Run `f` against the catalog without going through the store.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.catalog.borrow())
    }

    async fn stage(
        &self,
        folder: ImageFolder,
        upload: Option<ImageUpload>,
    ) -> Result<Option<ImageRef>, CommerceError> {
        match upload {
            Some(upload) => Ok(Some(self.images.store(folder, &upload).await?)),
            None => Ok(None),
        }
    }

    /// Release the fresh upload if the mutation failed, else the displaced
    /// images.
    async fn settle<T>(
        &self,
        staged: Option<ImageRef>,
        result: Result<(T, Vec<ImageRef>), CommerceError>,
    ) -> Result<T, CommerceError> {
        match result {
            Ok((value, released)) => {
                self.release_all(released).await;
                Ok(value)
            }
            Err(e) => {
                self.release_all(staged.into_iter().collect()).await;
                Err(e)
            }
        }
    }

    async fn release_all(&self, images: Vec<ImageRef>) {
        for image in images {
            if let Err(error) = self.images.release(&image).await {
                tracing::warn!(%image, %error, "failed to release image");
            }
        }
    }
}

#[async_trait(?Send)]
impl CatalogStore for MemoryCatalog {
    async fn list_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<MainCategory>, CommerceError> {
        Ok(self.catalog.borrow().list_main_categories(filter))
    }

    async fn list_sub_categories(
        &self,
        main_id: MainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<SubCategory>, CommerceError> {
        Ok(self.catalog.borrow().list_sub_categories(main_id, filter))
    }

    async fn list_products(
        &self,
        sub_id: SubCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<Product>, CommerceError> {
        Ok(self.catalog.borrow().list_products(sub_id, filter))
    }

    async fn list_all_products(&self, filter: ListFilter) -> Result<Vec<Product>, CommerceError> {
        Ok(self.catalog.borrow().list_all_products(filter))
    }

    async fn get_type_images(&self, product_id: ProductId) -> Result<TypeImages, CommerceError> {
        Ok(self.catalog.borrow().get_type_images(product_id))
    }

    async fn create_main_category(
        &self,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<MainCategory, CommerceError> {
        validate_name("category name", name)?;
        let staged = self.stage(ImageFolder::Products, image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .create_main_category(name, staged.clone())
            .map(|c| (c, Vec::new()));
        self.settle(staged, result).await
    }

    async fn update_main_category(
        &self,
        id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError> {
        validate_name("category name", name)?;
        self.catalog.borrow().get_main_category(id)?;
        let staged = self.stage(ImageFolder::Products, image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .update_main_category(id, name, staged.clone())
            .map(|released| ((), released));
        self.settle(staged, result).await
    }

    async fn remove_main_category_image(&self, id: MainCategoryId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().remove_main_category_image(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn delete_main_category(&self, id: MainCategoryId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().delete_main_category(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn create_sub_category(
        &self,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<SubCategory, CommerceError> {
        validate_name("sub category name", name)?;
        self.catalog.borrow().get_main_category(main_id)?;
        let staged = self.stage(ImageFolder::Products, image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .create_sub_category(main_id, name, staged.clone())
            .map(|s| (s, Vec::new()));
        self.settle(staged, result).await
    }

    async fn update_sub_category(
        &self,
        id: SubCategoryId,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError> {
        validate_name("sub category name", name)?;
        {
            let catalog = self.catalog.borrow();
            catalog.get_sub_category(id)?;
            catalog.get_main_category(main_id)?;
        }
        let staged = self.stage(ImageFolder::Products, image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .update_sub_category(id, main_id, name, staged.clone())
            .map(|released| ((), released));
        self.settle(staged, result).await
    }

    async fn remove_sub_category_image(&self, id: SubCategoryId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().remove_sub_category_image(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn delete_sub_category(&self, id: SubCategoryId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().delete_sub_category(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, CommerceError> {
        self.catalog.borrow_mut().create_product(input)
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().update_product(id, input)?;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().delete_product(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn set_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow().get_product(product_id)?;
        let stored = self.images.store(ImageFolder::Products, &image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .set_type_image(product_id, variant_type, stored.clone())
            .map(|released| ((), released));
        self.settle(Some(stored), result).await
    }

    async fn delete_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError> {
        let released = self
            .catalog
            .borrow_mut()
            .delete_type_image(product_id, variant_type)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn toggle_visibility(
        &self,
        kind: EntityKind,
        id: u64,
        value: bool,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().toggle_visibility(kind, id, value)
    }

    async fn list_case_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseMainCategory>, CommerceError> {
        Ok(self.catalog.borrow().list_case_main_categories(filter))
    }

    async fn list_phones(
        &self,
        main_id: CaseMainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<CasePhone>, CommerceError> {
        Ok(self.catalog.borrow().list_phones(main_id, filter))
    }

    async fn list_models(
        &self,
        phone_id: CasePhoneId,
        filter: ListFilter,
    ) -> Result<Vec<CaseModel>, CommerceError> {
        Ok(self.catalog.borrow().list_models(phone_id, filter))
    }

    async fn list_case_products(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseProduct>, CommerceError> {
        Ok(self.catalog.borrow().list_case_products(filter))
    }

    async fn list_variants(
        &self,
        case_product_id: CaseProductId,
        filter: ListFilter,
    ) -> Result<Vec<CaseVariant>, CommerceError> {
        Ok(self.catalog.borrow().list_variants(case_product_id, filter))
    }

    async fn case_variant_images(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<TypeImages, CommerceError> {
        Ok(self.catalog.borrow().case_variant_images(case_product_id))
    }

    async fn list_allowed_models(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<AllowedModel>, CommerceError> {
        Ok(self.catalog.borrow().list_allowed_models(case_product_id))
    }

    async fn list_model_mappings(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<ModelMapping>, CommerceError> {
        Ok(self.catalog.borrow().list_model_mappings(case_product_id))
    }

    async fn create_case_main_category(
        &self,
        name: &str,
    ) -> Result<CaseMainCategory, CommerceError> {
        self.catalog.borrow_mut().create_case_main_category(name)
    }

    async fn update_case_main_category(
        &self,
        id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().update_case_main_category(id, name)
    }

    async fn delete_case_main_category(
        &self,
        id: CaseMainCategoryId,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().delete_case_main_category(id)
    }

    async fn create_phone(
        &self,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<CasePhone, CommerceError> {
        self.catalog.borrow_mut().create_phone(main_id, name)
    }

    async fn update_phone(
        &self,
        id: CasePhoneId,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().update_phone(id, main_id, name)
    }

    async fn delete_phone(&self, id: CasePhoneId) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().delete_phone(id)
    }

    async fn create_model(
        &self,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<CaseModel, CommerceError> {
        self.catalog.borrow_mut().create_model(phone_id, name)
    }

    async fn update_model(
        &self,
        id: CaseModelId,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().update_model(id, phone_id, name)
    }

    async fn delete_model(&self, id: CaseModelId) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().delete_model(id)
    }

    async fn create_case_product(
        &self,
        input: &CaseProductInput,
    ) -> Result<CaseProduct, CommerceError> {
        self.catalog.borrow_mut().create_case_product(input)
    }

    async fn update_case_product(
        &self,
        id: CaseProductId,
        input: &CaseProductInput,
    ) -> Result<(), CommerceError> {
        self.catalog.borrow_mut().update_case_product(id, input)?;
        Ok(())
    }

    async fn delete_case_product(&self, id: CaseProductId) -> Result<(), CommerceError> {
        let released = self.catalog.borrow_mut().delete_case_product(id)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn set_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<CaseVariantId, CommerceError> {
        self.catalog.borrow().get_case_product(case_product_id)?;
        let stored = self.images.store(ImageFolder::Cases, &image).await?;
        let result = self
            .catalog
            .borrow_mut()
            .set_case_variant(case_product_id, variant_type, stored.clone())
            .map(|(variant, old)| (variant.id, old.into_iter().collect()));
        self.settle(Some(stored), result).await
    }

    async fn delete_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError> {
        let released = self
            .catalog
            .borrow_mut()
            .delete_case_variant(case_product_id, variant_type)?;
        self.release_all(released).await;
        Ok(())
    }

    async fn map_model(
        &self,
        case_product_id: CaseProductId,
        main_id: CaseMainCategoryId,
        phone_id: CasePhoneId,
        model_id: CaseModelId,
    ) -> Result<ModelMapping, CommerceError> {
        self.catalog
            .borrow_mut()
            .map_model(case_product_id, main_id, phone_id, model_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::MemoryImageStore;

    fn store() -> (MemoryCatalog, Rc<MemoryImageStore>) {
        let images = Rc::new(MemoryImageStore::new());
        (MemoryCatalog::new(Currency::INR, images.clone()), images)
    }

    fn png(name: &str) -> ImageUpload {
        ImageUpload::new(name, vec![0x89, b'P', b'N', b'G'])
    }

    #[tokio::test]
    async fn test_create_with_image_stores_upload() {
        let (catalog, images) = store();
        let main = catalog
            .create_main_category("Chargers", Some(png("chargers.png")))
            .await
            .unwrap();

        let image = main.image.clone().unwrap();
        assert!(image.as_str().starts_with("static/products/"));
        assert!(images.contains(&image));
    }

    #[tokio::test]
    async fn test_invalid_name_uploads_nothing() {
        let (catalog, images) = store();
        let err = catalog
            .create_main_category("  ", Some(png("x.png")))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_and_releases_old_image() {
        let (catalog, images) = store();
        let main = catalog
            .create_main_category("Chargers", Some(png("old.png")))
            .await
            .unwrap();
        let old = main.image.unwrap();

        catalog
            .update_main_category(main.id, "Power", Some(png("new.png")))
            .await
            .unwrap();

        assert!(!images.contains(&old));
        assert_eq!(images.len(), 1);
        let listed = catalog.list_main_categories(ListFilter::ALL).await.unwrap();
        assert_eq!(listed[0].name, "Power");
    }

    #[tokio::test]
    async fn test_delete_main_releases_subtree_images() {
        let (catalog, images) = store();
        let main = catalog
            .create_main_category("Audio", Some(png("a.png")))
            .await
            .unwrap();
        let sub = catalog
            .create_sub_category(main.id, "Buds", Some(png("b.png")))
            .await
            .unwrap();
        let product = catalog
            .create_product(&ProductInput::new(sub.id, "Pods", "1499"))
            .await
            .unwrap();
        catalog
            .set_type_image(product.id, VariantType::Type1, png("white.png"))
            .await
            .unwrap();
        assert_eq!(images.len(), 3);

        catalog.delete_main_category(main.id).await.unwrap();
        assert!(images.is_empty());
        assert!(catalog.list_all_products(ListFilter::ALL).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_image_on_missing_product_uploads_nothing() {
        let (catalog, images) = store();
        let err = catalog
            .set_type_image(ProductId::new(77), VariantType::Type2, png("x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_create_product_with_images_reports_failures() {
        let (catalog, _images) = store();
        let main = catalog.create_main_category("Cables", None).await.unwrap();
        let sub = catalog
            .create_sub_category(main.id, "USB-C", None)
            .await
            .unwrap();

        let (product, report) = catalog
            .create_product_with_images(
                &ProductInput::new(sub.id, "Braided 1m", "299"),
                vec![
                    (VariantType::Type1, png("black.png")),
                    (VariantType::Type2, ImageUpload::new("empty.png", Vec::<u8>::new())),
                    (VariantType::Type3, png("red.png")),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.uploaded, vec![VariantType::Type1, VariantType::Type3]);
        assert_eq!(report.failed_types(), vec![VariantType::Type2]);
        assert!(!report.is_complete());

        // The product stays, with the images that made it.
        let images = catalog.get_type_images(product.id).await.unwrap();
        assert_eq!(images.len(), 2);
        let listed = catalog.list_products(sub.id, ListFilter::ACTIVE).await.unwrap();
        assert!(listed[0].cover.is_some());
    }

    #[tokio::test]
    async fn test_case_variant_replace_and_delete() {
        let (catalog, images) = store();
        let case = catalog
            .create_case_product(&CaseProductInput::new("Armor", "799"))
            .await
            .unwrap();

        let first = catalog
            .set_case_variant(case.id, VariantType::Type1, png("clear.png"))
            .await
            .unwrap();
        let second = catalog
            .set_case_variant(case.id, VariantType::Type1, png("smoke.png"))
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(images.len(), 1);
        assert_eq!(
            catalog.list_variants(case.id, ListFilter::ALL).await.unwrap().len(),
            1
        );

        let shown = catalog.case_variant_images(case.id).await.unwrap();
        assert!(shown
            .get(VariantType::Type1)
            .unwrap()
            .as_str()
            .starts_with("static/cases/"));

        catalog
            .delete_case_variant(case.id, VariantType::Type1)
            .await
            .unwrap();
        assert!(images.is_empty());

        let err = catalog
            .delete_case_variant(case.id, VariantType::Type1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_products_for_model_default_matches_catalog() {
        let (catalog, _images) = store();
        let main = catalog.create_case_main_category("iPhone").await.unwrap();
        let phone = catalog.create_phone(main.id, "iPhone 15").await.unwrap();
        let pro = catalog.create_model(phone.id, "15 Pro").await.unwrap();
        let plus = catalog.create_model(phone.id, "15 Plus").await.unwrap();
        let case = catalog
            .create_case_product(&CaseProductInput::new("Armor", "799"))
            .await
            .unwrap();
        catalog
            .map_model(case.id, main.id, phone.id, pro.id)
            .await
            .unwrap();

        let for_pro = catalog.list_case_products_for_model(pro.id).await.unwrap();
        assert_eq!(for_pro.len(), 1);
        assert_eq!(
            for_pro,
            catalog.with_catalog(|c| c.list_case_products_for_model(pro.id))
        );
        assert!(catalog
            .list_case_products_for_model(plus.id)
            .await
            .unwrap()
            .is_empty());
    }
}
