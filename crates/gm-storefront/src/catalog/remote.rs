//! Catalog store backed by the storefront REST API.

use super::wire::{
    self, AllowedModelRow, CaseMainCategoryRow, CaseModelRow, CasePhoneRow, CaseProductRow,
    CaseVariantRow, Created, MainCategoryRow, MapResult, MappingRow, ProductRow, SubCategoryRow,
};
use super::CatalogStore;
use async_trait::async_trait;
use gm_auth::{Audience, Session};
use gm_commerce::cases::{
    AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseProductInput,
    CaseVariant, ModelMapping,
};
use gm_commerce::catalog::{
    validate_name, EntityKind, ImageUpload, ListFilter, MainCategory, Product, ProductInput,
    SubCategory, TypeImages, VariantType,
};
use gm_commerce::ids::*;
use gm_commerce::{CommerceError, Currency};
use gm_data::{ClientRequestBuilder, FetchClient, Form, Method, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

const ADMIN_CATALOG: &str = "/admin/catalog";
const ADMIN_CASES: &str = "/admin/cases";

/// Talks to the shopper and admin catalog endpoints.
///
/// Active-only lists use the shopper endpoints, which filter on the server;
/// unfiltered lists use the admin endpoints. Admin calls carry the admin
/// token from the [`Session`] when one is present. A 404 on a list means
/// the parent is gone and yields an empty list; on anything else it
/// becomes `NotFound` for the entity addressed.
///
/// Creates answer with the new id only, so returned entities are built from
/// that id and the submitted fields. Admin product listings carry no cover
/// image.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    http: FetchClient,
    session: Session,
    currency: Currency,
}

impl RemoteCatalog {
    pub fn new(http: FetchClient, session: Session, currency: Currency) -> Self {
        Self {
            http,
            session,
            currency,
        }
    }

    fn public(&self, path: String) -> ClientRequestBuilder {
        self.http.get(path)
    }

    fn admin(&self, method: Method, path: String) -> ClientRequestBuilder {
        self.http
            .request(method, path)
            .maybe_bearer_auth(self.session.token(Audience::Admin))
    }

    async fn send(
        &self,
        request: ClientRequestBuilder,
        kind: EntityKind,
        id: impl ToString,
    ) -> Result<Response, CommerceError> {
        let response = request.send().await?;
        if response.status == 404 {
            return Err(kind.not_found(id));
        }
        Ok(response.error_for_status()?)
    }

    async fn rows<R: DeserializeOwned>(
        &self,
        request: ClientRequestBuilder,
    ) -> Result<Vec<R>, CommerceError> {
        let response = request.send().await?;
        if response.status == 404 {
            return Ok(Vec::new());
        }
        Ok(response.error_for_status()?.json()?)
    }

    async fn created(
        &self,
        request: ClientRequestBuilder,
        parent: EntityKind,
        parent_id: impl ToString,
    ) -> Result<u64, CommerceError> {
        let created: Created = self.send(request, parent, parent_id).await?.json()?;
        Ok(created.id)
    }

    fn toggle_path(&self, kind: EntityKind, id: u64) -> String {
        match kind {
            EntityKind::MainCategory => format!("{ADMIN_CATALOG}/main-category/{id}/toggle"),
            EntityKind::SubCategory => format!("{ADMIN_CATALOG}/sub-category/{id}/toggle"),
            EntityKind::Product => format!("{ADMIN_CATALOG}/product/{id}/toggle"),
            EntityKind::CaseMainCategory => format!("{ADMIN_CASES}/main-category/{id}/toggle"),
            EntityKind::CasePhone => format!("{ADMIN_CASES}/phone/{id}/toggle"),
            EntityKind::CaseModel => format!("{ADMIN_CASES}/model/{id}/toggle"),
            EntityKind::CaseProduct => format!("{ADMIN_CASES}/case-product/{id}/toggle"),
            EntityKind::CaseVariant => format!("{ADMIN_CASES}/variant/{id}/toggle"),
            EntityKind::ModelMapping => format!("{ADMIN_CASES}/map/{id}/toggle"),
        }
    }

    fn products(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, CommerceError> {
        wire::convert(rows, |r| r.into_product(self.currency))
    }

    fn case_products(&self, rows: Vec<CaseProductRow>) -> Result<Vec<CaseProduct>, CommerceError> {
        wire::convert(rows, |r| r.into_case_product(self.currency))
    }
}

fn with_image(form: Form, upload: Option<&ImageUpload>) -> Form {
    match upload {
        Some(upload) => form.file(
            "image",
            upload.filename.clone(),
            upload.content_type.clone(),
            upload.bytes.clone(),
        ),
        None => form,
    }
}

fn product_form(input: &ProductInput, currency: Currency) -> Result<Form, CommerceError> {
    let fields = input.validate(currency)?;
    Ok(Form::new()
        .text("name", fields.name)
        .text("subtitle", fields.subtitle)
        .text("price", fields.price.to_field())
        .text("discount_percent", fields.discount.percent().to_string())
        .text("sub_category_id", fields.sub_category_id.to_string()))
}

fn case_product_form(input: &CaseProductInput, currency: Currency) -> Result<Form, CommerceError> {
    let fields = input.validate(currency)?;
    Ok(Form::new()
        .text("title", fields.title)
        .text("subtitle", fields.subtitle)
        .text("price", fields.price.to_field())
        .text("discount_percent", fields.discount.percent().to_string()))
}

#[async_trait(?Send)]
impl CatalogStore for RemoteCatalog {
    // === Product hierarchy ===

    async fn list_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<MainCategory>, CommerceError> {
        let request = if filter.active_only {
            self.public("/catalog/categories".to_string())
        } else {
            self.admin(Method::Get, format!("{ADMIN_CATALOG}/main-categories"))
        };
        let rows: Vec<MainCategoryRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_sub_categories(
        &self,
        main_id: MainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<SubCategory>, CommerceError> {
        let request = if filter.active_only {
            self.public(format!("/catalog/categories/{main_id}/sub"))
        } else {
            self.admin(
                Method::Get,
                format!("{ADMIN_CATALOG}/sub-categories/by-main/{main_id}"),
            )
        };
        let rows: Vec<SubCategoryRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_products(
        &self,
        sub_id: SubCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<Product>, CommerceError> {
        let request = if filter.active_only {
            self.public(format!("/catalog/products/sub/{sub_id}"))
        } else {
            self.admin(
                Method::Get,
                format!("{ADMIN_CATALOG}/products/by-sub-category/{sub_id}"),
            )
        };
        let rows = self.rows(request).await?;
        self.products(rows)
    }

    async fn list_all_products(&self, filter: ListFilter) -> Result<Vec<Product>, CommerceError> {
        if filter.active_only {
            let rows = self.rows(self.public("/catalog/products".to_string())).await?;
            return self.products(rows);
        }
        // No admin endpoint lists everything; walk the hierarchy.
        let mut all = Vec::new();
        for main in self.list_main_categories(filter).await? {
            for sub in self.list_sub_categories(main.id, filter).await? {
                all.extend(self.list_products(sub.id, filter).await?);
            }
        }
        Ok(all)
    }

    async fn get_type_images(&self, product_id: ProductId) -> Result<TypeImages, CommerceError> {
        let request = self.admin(
            Method::Get,
            format!("{ADMIN_CATALOG}/product/{product_id}/type-images"),
        );
        let raw: BTreeMap<String, Option<String>> = self
            .send(request, EntityKind::Product, product_id)
            .await?
            .json()?;
        Ok(wire::type_images(raw, &format!("product {product_id}")))
    }

    async fn create_main_category(
        &self,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<MainCategory, CommerceError> {
        let name = validate_name("category name", name)?;
        let form = with_image(Form::new().text("name", name.clone()), image.as_ref());
        let request = self
            .admin(Method::Post, format!("{ADMIN_CATALOG}/main-category"))
            .form(form);
        let id = MainCategoryId::new(self.created(request, EntityKind::MainCategory, "new").await?);

        if image.is_some() {
            // The stored image path is only known to the server.
            let listed = self.list_main_categories(ListFilter::ALL).await?;
            if let Some(found) = listed.into_iter().find(|m| m.id == id) {
                return Ok(found);
            }
        }
        Ok(MainCategory::new(id, name, None))
    }

    async fn update_main_category(
        &self,
        id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError> {
        let name = validate_name("category name", name)?;
        let form = with_image(Form::new().text("name", name), image.as_ref());
        let request = self
            .admin(Method::Put, format!("{ADMIN_CATALOG}/main-category/{id}"))
            .form(form);
        self.send(request, EntityKind::MainCategory, id).await?;
        Ok(())
    }

    async fn remove_main_category_image(&self, id: MainCategoryId) -> Result<(), CommerceError> {
        let request = self.admin(
            Method::Delete,
            format!("{ADMIN_CATALOG}/main-category/{id}/image"),
        );
        self.send(request, EntityKind::MainCategory, id).await?;
        Ok(())
    }

    async fn delete_main_category(&self, id: MainCategoryId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CATALOG}/main-category/{id}"));
        self.send(request, EntityKind::MainCategory, id).await?;
        Ok(())
    }

    async fn create_sub_category(
        &self,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<SubCategory, CommerceError> {
        let name = validate_name("sub category name", name)?;
        let form = with_image(
            Form::new()
                .text("name", name.clone())
                .text("main_category_id", main_id.to_string()),
            image.as_ref(),
        );
        let request = self
            .admin(Method::Post, format!("{ADMIN_CATALOG}/sub-category"))
            .form(form);
        let id = SubCategoryId::new(self.created(request, EntityKind::MainCategory, main_id).await?);

        if image.is_some() {
            let listed = self.list_sub_categories(main_id, ListFilter::ALL).await?;
            if let Some(found) = listed.into_iter().find(|s| s.id == id) {
                return Ok(found);
            }
        }
        Ok(SubCategory::new(id, main_id, name, None))
    }

    async fn update_sub_category(
        &self,
        id: SubCategoryId,
        main_id: MainCategoryId,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<(), CommerceError> {
        let name = validate_name("sub category name", name)?;
        let form = with_image(
            Form::new()
                .text("name", name)
                .text("main_category_id", main_id.to_string()),
            image.as_ref(),
        );
        let request = self
            .admin(Method::Put, format!("{ADMIN_CATALOG}/sub-category/{id}"))
            .form(form);
        self.send(request, EntityKind::SubCategory, id).await?;
        Ok(())
    }

    async fn remove_sub_category_image(&self, id: SubCategoryId) -> Result<(), CommerceError> {
        let request = self.admin(
            Method::Delete,
            format!("{ADMIN_CATALOG}/sub-category/{id}/image"),
        );
        self.send(request, EntityKind::SubCategory, id).await?;
        Ok(())
    }

    async fn delete_sub_category(&self, id: SubCategoryId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CATALOG}/sub-category/{id}"));
        self.send(request, EntityKind::SubCategory, id).await?;
        Ok(())
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, CommerceError> {
        let fields = input.validate(self.currency)?;
        let request = self
            .admin(Method::Post, format!("{ADMIN_CATALOG}/product"))
            .form(product_form(input, self.currency)?);
        let id = self
            .created(request, EntityKind::SubCategory, fields.sub_category_id)
            .await?;
        Ok(Product {
            id: ProductId::new(id),
            name: fields.name,
            subtitle: fields.subtitle,
            price: fields.price,
            discount: fields.discount,
            is_available: true,
            sub_category_id: fields.sub_category_id,
            cover: None,
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), CommerceError> {
        let request = self
            .admin(Method::Put, format!("{ADMIN_CATALOG}/product/{id}"))
            .form(product_form(input, self.currency)?);
        self.send(request, EntityKind::Product, id).await?;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CATALOG}/product/{id}"));
        self.send(request, EntityKind::Product, id).await?;
        Ok(())
    }

    async fn set_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<(), CommerceError> {
        let form = with_image(
            Form::new().text("type_name", variant_type.as_str()),
            Some(&image),
        );
        let request = self
            .admin(
                Method::Post,
                format!("{ADMIN_CATALOG}/product/{product_id}/type-image"),
            )
            .form(form);
        self.send(request, EntityKind::Product, product_id).await?;
        Ok(())
    }

    async fn delete_type_image(
        &self,
        product_id: ProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError> {
        let request = self.admin(
            Method::Delete,
            format!("{ADMIN_CATALOG}/product/{product_id}/type-image/{variant_type}"),
        );
        self.send(request, EntityKind::Product, product_id).await?;
        Ok(())
    }

    async fn toggle_visibility(
        &self,
        kind: EntityKind,
        id: u64,
        value: bool,
    ) -> Result<(), CommerceError> {
        let form = Form::new().text(kind.flag_field(), value.to_string());
        let request = self
            .admin(Method::Put, self.toggle_path(kind, id))
            .form(form);
        self.send(request, kind, id).await?;
        Ok(())
    }

    // === Case taxonomy ===

    async fn list_case_main_categories(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseMainCategory>, CommerceError> {
        let request = if filter.active_only {
            self.public("/cases/main-categories".to_string())
        } else {
            self.admin(Method::Get, format!("{ADMIN_CASES}/main-categories"))
        };
        let rows: Vec<CaseMainCategoryRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_phones(
        &self,
        main_id: CaseMainCategoryId,
        filter: ListFilter,
    ) -> Result<Vec<CasePhone>, CommerceError> {
        let request = if filter.active_only {
            self.public(format!("/cases/phones/by-main/{main_id}"))
        } else {
            self.admin(Method::Get, format!("{ADMIN_CASES}/phones/by-main/{main_id}"))
        };
        let rows: Vec<CasePhoneRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_models(
        &self,
        phone_id: CasePhoneId,
        filter: ListFilter,
    ) -> Result<Vec<CaseModel>, CommerceError> {
        let request = if filter.active_only {
            self.public(format!("/cases/models/by-phone/{phone_id}"))
        } else {
            self.admin(Method::Get, format!("{ADMIN_CASES}/models/by-phone/{phone_id}"))
        };
        let rows: Vec<CaseModelRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_case_products(
        &self,
        filter: ListFilter,
    ) -> Result<Vec<CaseProduct>, CommerceError> {
        let request = if filter.active_only {
            self.public("/cases/products".to_string())
        } else {
            self.admin(Method::Get, format!("{ADMIN_CASES}/case-products"))
        };
        let rows = self.rows(request).await?;
        self.case_products(rows)
    }

    async fn list_variants(
        &self,
        case_product_id: CaseProductId,
        filter: ListFilter,
    ) -> Result<Vec<CaseVariant>, CommerceError> {
        if filter.active_only {
            let active = self.list_case_products(ListFilter::ACTIVE).await?;
            if !active.iter().any(|p| p.id == case_product_id) {
                return Ok(Vec::new());
            }
        }
        let request = self.admin(
            Method::Get,
            format!("{ADMIN_CASES}/case-product/{case_product_id}/variants"),
        );
        let rows: Vec<CaseVariantRow> = self.rows(request).await?;
        let variants = wire::convert(rows, |r| r.into_variant(case_product_id))?;
        Ok(variants
            .into_iter()
            .filter(|v| filter.admits(v.is_active))
            .collect())
    }

    async fn case_variant_images(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<TypeImages, CommerceError> {
        let request = self.public(format!("/cases/product/{case_product_id}/variants"));
        let raw: BTreeMap<String, Option<String>> = self
            .send(request, EntityKind::CaseProduct, case_product_id)
            .await?
            .json()?;
        Ok(wire::type_images(
            raw,
            &format!("case product {case_product_id}"),
        ))
    }

    async fn list_allowed_models(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<AllowedModel>, CommerceError> {
        let request = self.public(format!("/cases/product/{case_product_id}/allowed-models"));
        let rows: Vec<AllowedModelRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_model_mappings(
        &self,
        case_product_id: CaseProductId,
    ) -> Result<Vec<ModelMapping>, CommerceError> {
        let request = self.admin(
            Method::Get,
            format!("{ADMIN_CASES}/case-product/{case_product_id}/mapped-models"),
        );
        let rows: Vec<MappingRow> = self.rows(request).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_case_main_category(
        &self,
        name: &str,
    ) -> Result<CaseMainCategory, CommerceError> {
        let name = validate_name("case category name", name)?;
        let request = self
            .admin(Method::Post, format!("{ADMIN_CASES}/main-category"))
            .form(Form::new().text("name", name.clone()));
        let id = self
            .created(request, EntityKind::CaseMainCategory, "new")
            .await?;
        Ok(CaseMainCategory {
            id: CaseMainCategoryId::new(id),
            name,
            is_active: true,
        })
    }

    async fn update_case_main_category(
        &self,
        id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("case category name", name)?;
        let request = self
            .admin(Method::Put, format!("{ADMIN_CASES}/main-category/{id}"))
            .form(Form::new().text("name", name));
        self.send(request, EntityKind::CaseMainCategory, id).await?;
        Ok(())
    }

    async fn delete_case_main_category(
        &self,
        id: CaseMainCategoryId,
    ) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CASES}/main-category/{id}"));
        self.send(request, EntityKind::CaseMainCategory, id).await?;
        Ok(())
    }

    async fn create_phone(
        &self,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<CasePhone, CommerceError> {
        let name = validate_name("phone name", name)?;
        let form = Form::new()
            .text("name", name.clone())
            .text("case_main_category_id", main_id.to_string());
        let request = self
            .admin(Method::Post, format!("{ADMIN_CASES}/phone"))
            .form(form);
        let id = self
            .created(request, EntityKind::CaseMainCategory, main_id)
            .await?;
        Ok(CasePhone {
            id: CasePhoneId::new(id),
            name,
            main_category_id: main_id,
            is_active: true,
        })
    }

    async fn update_phone(
        &self,
        id: CasePhoneId,
        main_id: CaseMainCategoryId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("phone name", name)?;
        let form = Form::new()
            .text("name", name)
            .text("case_main_category_id", main_id.to_string());
        let request = self
            .admin(Method::Put, format!("{ADMIN_CASES}/phone/{id}"))
            .form(form);
        self.send(request, EntityKind::CasePhone, id).await?;
        Ok(())
    }

    async fn delete_phone(&self, id: CasePhoneId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CASES}/phone/{id}"));
        self.send(request, EntityKind::CasePhone, id).await?;
        Ok(())
    }

    async fn create_model(
        &self,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<CaseModel, CommerceError> {
        let name = validate_name("model name", name)?;
        let form = Form::new()
            .text("name", name.clone())
            .text("case_phone_id", phone_id.to_string());
        let request = self
            .admin(Method::Post, format!("{ADMIN_CASES}/model"))
            .form(form);
        let id = self.created(request, EntityKind::CasePhone, phone_id).await?;
        Ok(CaseModel {
            id: CaseModelId::new(id),
            name,
            phone_id,
            is_active: true,
        })
    }

    async fn update_model(
        &self,
        id: CaseModelId,
        phone_id: CasePhoneId,
        name: &str,
    ) -> Result<(), CommerceError> {
        let name = validate_name("model name", name)?;
        let form = Form::new()
            .text("name", name)
            .text("case_phone_id", phone_id.to_string());
        let request = self
            .admin(Method::Put, format!("{ADMIN_CASES}/model/{id}"))
            .form(form);
        self.send(request, EntityKind::CaseModel, id).await?;
        Ok(())
    }

    async fn delete_model(&self, id: CaseModelId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CASES}/model/{id}"));
        self.send(request, EntityKind::CaseModel, id).await?;
        Ok(())
    }

    async fn create_case_product(
        &self,
        input: &CaseProductInput,
    ) -> Result<CaseProduct, CommerceError> {
        let fields = input.validate(self.currency)?;
        let request = self
            .admin(Method::Post, format!("{ADMIN_CASES}/case-product"))
            .form(case_product_form(input, self.currency)?);
        let id = self.created(request, EntityKind::CaseProduct, "new").await?;
        Ok(CaseProduct {
            id: CaseProductId::new(id),
            title: fields.title,
            subtitle: fields.subtitle,
            price: fields.price,
            discount: fields.discount,
            is_active: true,
        })
    }

    async fn update_case_product(
        &self,
        id: CaseProductId,
        input: &CaseProductInput,
    ) -> Result<(), CommerceError> {
        let request = self
            .admin(Method::Put, format!("{ADMIN_CASES}/case-product/{id}"))
            .form(case_product_form(input, self.currency)?);
        self.send(request, EntityKind::CaseProduct, id).await?;
        Ok(())
    }

    async fn delete_case_product(&self, id: CaseProductId) -> Result<(), CommerceError> {
        let request = self.admin(Method::Delete, format!("{ADMIN_CASES}/case-product/{id}"));
        self.send(request, EntityKind::CaseProduct, id).await?;
        Ok(())
    }

    async fn set_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
        image: ImageUpload,
    ) -> Result<CaseVariantId, CommerceError> {
        let form = with_image(
            Form::new().text("type_name", variant_type.as_str()),
            Some(&image),
        );
        let request = self
            .admin(
                Method::Post,
                format!("{ADMIN_CASES}/case-product/{case_product_id}/variant"),
            )
            .form(form);
        let id = self
            .created(request, EntityKind::CaseProduct, case_product_id)
            .await?;
        Ok(CaseVariantId::new(id))
    }

    async fn delete_case_variant(
        &self,
        case_product_id: CaseProductId,
        variant_type: VariantType,
    ) -> Result<(), CommerceError> {
        let request = self.admin(
            Method::Delete,
            format!("{ADMIN_CASES}/case-product/{case_product_id}/variant/{variant_type}"),
        );
        self.send(
            request,
            EntityKind::CaseVariant,
            format!("{case_product_id}/{variant_type}"),
        )
        .await?;
        Ok(())
    }

    async fn map_model(
        &self,
        case_product_id: CaseProductId,
        main_id: CaseMainCategoryId,
        phone_id: CasePhoneId,
        model_id: CaseModelId,
    ) -> Result<ModelMapping, CommerceError> {
        let form = Form::new()
            .text("case_main_category_id", main_id.to_string())
            .text("case_phone_id", phone_id.to_string())
            .text("case_model_id", model_id.to_string());
        let request = self
            .admin(
                Method::Post,
                format!("{ADMIN_CASES}/case-product/{case_product_id}/map-model"),
            )
            .form(form);
        let result: MapResult = self
            .send(request, EntityKind::CaseProduct, case_product_id)
            .await?
            .json()?;

        if let Some(id) = result.id {
            return Ok(ModelMapping {
                id: ModelMappingId::new(id),
                case_product_id,
                main_category_id: main_id,
                phone_id,
                model_id,
                is_active: true,
            });
        }
        tracing::debug!(%case_product_id, %model_id, message = %result.message, "model already mapped");
        self.list_model_mappings(case_product_id)
            .await?
            .into_iter()
            .find(|m| m.model_id == model_id)
            .ok_or_else(|| EntityKind::ModelMapping.not_found(format!("{case_product_id}/{model_id}")))
    }
}
