//! Catalog access behind one async interface.
//!
//! [`MemoryCatalog`] keeps everything in process; [`RemoteCatalog`] talks to
//! the storefront REST API. Both follow the same rules: lists under a
//! missing parent are empty, mutations of a missing id fail with
//! `NotFound`, and input is validated before anything is stored or sent.

mod memory;
mod remote;
mod wire;

pub use memory::MemoryCatalog;
pub use remote::RemoteCatalog;

use async_trait::async_trait;
use gm_commerce::cases::{
    AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductInput,
    CaseVariant, ModelMapping,
};
use gm_commerce::catalog::{
    EntityKind, ImageUpload, ListFilter, MainCategory, Product, ProductInput, SubCategory,
    TypeImages, VariantType,
};
use gm_commerce::ids::*;
use gm_commerce::CommerceError;

/// Outcome of a type-image batch.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<VariantType>,
    pub failed: Vec<(VariantType, CommerceError)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_types(&self) -> Vec<VariantType> {
        self.failed.iter().map(|(t, _)| *t).collect()
    }
}

/// Read and write access to the catalog and the case taxonomy.
#[async_trait(?Send)]
pub trait CatalogStore {
    // === Product hierarchy ===

    async fn list_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<MainCategory>, CommerceError>;

    async fn list_sub_categories(
        &self,
        main_id: MainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<SubCategory>, CommerceError>;

    async fn list_products(
        &self,
        sub_id: SubCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<Product>, CommerceError>;

    /// Every product across all sub categories.
    async fn list_all_products(&self, filter: ListFilter) -> Result<Vec<Product>, CommerceError>;

    async fn get_type_images(&self, product_id: ProductId) -> Result<TypeImages, CommerceError>;

    async fn create_main_category(
        &self,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<MainCategory, CommerceError>;

    /// Rename, and replace the image when one is given.
    async fn update_main_category(
        &self,
        id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError>;

    async fn remove_main_category_image(&self, id: MainCategoryId) -> Result<(), CommerceError>;

    /// Delete with every sub category and product below it.
    async fn delete_main_category(&self, id: MainCategoryId) -> Result<(), CommerceError>;

    async fn create_sub_category(
        &self,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<SubCategory, CommerceError>;

    async fn update_sub_category(
        &self,
        id: SubCategoryId,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError>;

    async fn remove_sub_category_image(&self, id: SubCategoryId) -> Result<(), CommerceError>;

    async fn delete_sub_category(&self, id: SubCategoryId) -> Result<(), CommerceError>;

    async fn create_product(&self, input: &ProductInput) -> Result<Product, CommerceError>;

    async fn update_product(&self, id: ProductId, input: &ProductInput)
        -> Result<(), CommerceError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError>;

    /// Upload the image for one type, replacing any previous one.
    async fn set_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<(), CommerceError>;

    /// Removing a type that has no image is a no-op.
    async fn delete_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError>;

    /// Set one visibility flag. Never touches descendants.
    async fn toggle_visibility(
        &self,
        kind: EntityKind,
        id: u64,
        value: bool,
    ) -> Result<(), CommerceError>;

    // === Case taxonomy ===

    async fn list_case_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseMainCategory>, CommerceError>;

    async fn list_phones(
        &self,
        main_id: CaseMainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<CasePhone>, CommerceError>;

    async fn list_models(
        &self,
        phone_id: CasePhoneId,
        filter: ListFilter,
    ) -> Result<Vec<CaseModel>, CommerceError>;

    async fn list_case_products(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseProduct>, CommerceError>;

    async fn list_variants(
        &self,
        case_product_id: CaseProductId,
        filter: ListFilter,
    ) -> Result<Vec<CaseVariant>, CommerceError>;

    /// Shopper view of the active variants as a type → image map.
    async fn case_variant_images(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<TypeImages, CommerceError>;

    async fn list_allowed_models(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<AllowedModel>, CommerceError>;

    async fn list_model_mappings(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<ModelMapping>, CommerceError>;

    async fn create_case_main_category(&self, name: &str)
        -> Result<CaseMainCategory, CommerceError>;

    async fn update_case_main_category(
        &self,
        id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError>;

    async fn delete_case_main_category(&self, id: CaseMainCategoryId)
        -> Result<(), CommerceError>;

    async fn create_phone(
        &self,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<CasePhone, CommerceError>;

    async fn update_phone(
        &self,
        id: CasePhoneId,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError>;

    async fn delete_phone(&self, id: CasePhoneId) -> Result<(), CommerceError>;

    async fn create_model(
        &self,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<CaseModel, CommerceError>;

    async fn update_model(
        &self,
        id: CaseModelId,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<(), CommerceError>;

    async fn delete_model(&self, id: CaseModelId) -> Result<(), CommerceError>;

    async fn create_case_product(
        &self,
        input: &CaseProductInput,
    ) -> Result<CaseProduct, CommerceError>;

    async fn update_case_product(
        &self,
        id: CaseProductId,
        input: &CaseProductInput,
    ) -> Result<(), CommerceError>;

    /// Delete with its variants and mappings.
    async fn delete_case_product(&self, id: CaseProductId) -> Result<(), CommerceError>;

    /// Upload the image for one variant slot, replacing any previous one.
    async fn set_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<CaseVariantId, CommerceError>;

    async fn delete_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError>;

    /// Allow a case product for a model. Mapping twice returns the existing
    /// row.
    async fn map_model(
        &self,
        case_product_id: CaseProductId,
        main_id: CaseMainCategoryId,
        phone_id: CasePhoneId,
        model_id: CaseModelId,
    ) -> Result<ModelMapping, CommerceError>;

    // === Provided ===

    /// Active case products a shopper can buy for `model_id`.
    async fn list_case_products_for_model(
        &self,
        model_id: CaseModelId,
    ) -> Result<Vec<CaseProduct>, CommerceError> {
        let mut matching = Vec::new();
        for product in self.list_case_products(ListFilter::ACTIVE).await? {
            let allowed = self.list_allowed_models(product.id).await?;
            if allowed.iter().any(|m| m.model_id == model_id) {
                matching.push(product);
            }
        }
        Ok(matching)
    }

    /// Upload several type images one after another.
    ///
    /// A failed type is logged and reported; the rest still upload and the
    /// product is kept.
    async fn upload_type_images(
        &self,
        product_id: ProductId,
        uploads: Vec<(VariantType, ImageUpload)>,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        for (variant_type, upload) in uploads {
            match self.set_type_image(product_id, variant_type, upload).await {
                Ok(()) => report.uploaded.push(variant_type),
                Err(error) => {
                    tracing::warn!(%product_id, %variant_type, %error, "type image upload failed");
                    report.failed.push((variant_type, error));
                }
            }
        }
        report
    }

    /// Create a product, then upload its type images.
    async fn create_product_with_images(
        &self,
        input: &ProductInput,
        uploads: Vec<(VariantType, ImageUpload)>,
    ) -> Result<(Product, UploadReport), CommerceError> {
        let product = self.create_product(input).await?;
        let report = self.upload_type_images(product.id, uploads).await;
        Ok((product, report))
    }
}
