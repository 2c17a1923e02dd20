//! JSON shapes of the storefront API.
//!
//! Rows come straight from the database, so flags may arrive as `true`,
//! `1` or `"1"`, and prices are bare numbers in major units.

use gm_commerce::cases::{
    AllowedModel, CaseMainCategory, CaseModel, CasePhone, CaseProduct, CaseVariant, ModelMapping,
};
use gm_commerce::catalog::{
    Discount, ImageRef, MainCategory, Product, SubCategory, TypeImages, VariantType,
};
use gm_commerce::ids::*;
use gm_commerce::{CommerceError, Currency, Money};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(D::Error::custom(format!("not a flag: {other:?}"))),
        },
        Value::Null => Ok(false),
        other => Err(D::Error::custom(format!("not a flag: {other}"))),
    }
}

fn yes() -> bool {
    true
}

fn image(path: Option<String>) -> Option<ImageRef> {
    path.filter(|p| !p.trim().is_empty()).map(ImageRef::new)
}

fn discount(percent: Option<i64>) -> Result<Discount, CommerceError> {
    Discount::new(percent.unwrap_or(0))
}

fn variant_type(name: &str) -> Result<VariantType, CommerceError> {
    name.parse()
}

/// `{"id": 12}` as returned by every create.
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub id: u64,
}

/// Answer of `map-model`; `id` is missing when the mapping already existed.
#[derive(Debug, Deserialize)]
pub(crate) struct MapResult {
    pub id: Option<u64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainCategoryRow {
    id: u64,
    name: String,
    image: Option<String>,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl From<MainCategoryRow> for MainCategory {
    fn from(row: MainCategoryRow) -> Self {
        MainCategory {
            id: MainCategoryId::new(row.id),
            name: row.name,
            image: image(row.image),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubCategoryRow {
    id: u64,
    name: String,
    image: Option<String>,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
    main_category_id: u64,
}

impl From<SubCategoryRow> for SubCategory {
    fn from(row: SubCategoryRow) -> Self {
        SubCategory {
            id: SubCategoryId::new(row.id),
            name: row.name,
            image: image(row.image),
            is_active: row.is_active,
            main_category_id: MainCategoryId::new(row.main_category_id),
        }
    }
}

/// A product row. Shopper listings add `image` (the type1 image) and drop
/// `is_available`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductRow {
    id: u64,
    name: String,
    #[serde(default)]
    subtitle: Option<String>,
    price: serde_json::Number,
    #[serde(default)]
    discount_percent: Option<i64>,
    sub_category_id: u64,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_available: bool,
    #[serde(default)]
    image: Option<String>,
}

impl ProductRow {
    pub fn into_product(self, currency: Currency) -> Result<Product, CommerceError> {
        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            subtitle: self.subtitle.unwrap_or_default(),
            price: Money::from_json_number(&self.price, currency)?,
            discount: discount(self.discount_percent)?,
            is_available: self.is_available,
            sub_category_id: SubCategoryId::new(self.sub_category_id),
            cover: image(self.image),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaseMainCategoryRow {
    id: u64,
    name: String,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl From<CaseMainCategoryRow> for CaseMainCategory {
    fn from(row: CaseMainCategoryRow) -> Self {
        CaseMainCategory {
            id: CaseMainCategoryId::new(row.id),
            name: row.name,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CasePhoneRow {
    id: u64,
    name: String,
    case_main_category_id: u64,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl From<CasePhoneRow> for CasePhone {
    fn from(row: CasePhoneRow) -> Self {
        CasePhone {
            id: CasePhoneId::new(row.id),
            name: row.name,
            main_category_id: CaseMainCategoryId::new(row.case_main_category_id),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaseModelRow {
    id: u64,
    name: String,
    case_phone_id: u64,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl From<CaseModelRow> for CaseModel {
    fn from(row: CaseModelRow) -> Self {
        CaseModel {
            id: CaseModelId::new(row.id),
            name: row.name,
            phone_id: CasePhoneId::new(row.case_phone_id),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaseProductRow {
    id: u64,
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    price: serde_json::Number,
    #[serde(default)]
    discount_percent: Option<i64>,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl CaseProductRow {
    pub fn into_case_product(self, currency: Currency) -> Result<CaseProduct, CommerceError> {
        Ok(CaseProduct {
            id: CaseProductId::new(self.id),
            title: self.title,
            subtitle: self.subtitle.unwrap_or_default(),
            price: Money::from_json_number(&self.price, currency)?,
            discount: discount(self.discount_percent)?,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaseVariantRow {
    id: u64,
    type_name: String,
    image: String,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl CaseVariantRow {
    pub fn into_variant(
        self,
        case_product_id: CaseProductId,
    ) -> Result<CaseVariant, CommerceError> {
        Ok(CaseVariant {
            id: CaseVariantId::new(self.id),
            case_product_id,
            variant_type: variant_type(&self.type_name)?,
            image: ImageRef::new(self.image),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MappingRow {
    id: u64,
    case_product_id: u64,
    case_main_category_id: u64,
    case_phone_id: u64,
    case_model_id: u64,
    #[serde(default = "yes", deserialize_with = "flag")]
    is_active: bool,
}

impl From<MappingRow> for ModelMapping {
    fn from(row: MappingRow) -> Self {
        ModelMapping {
            id: ModelMappingId::new(row.id),
            case_product_id: CaseProductId::new(row.case_product_id),
            main_category_id: CaseMainCategoryId::new(row.case_main_category_id),
            phone_id: CasePhoneId::new(row.case_phone_id),
            model_id: CaseModelId::new(row.case_model_id),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllowedModelRow {
    map_id: u64,
    case_main_category_id: u64,
    case_phone_id: u64,
    case_model_id: u64,
    main_name: String,
    phone_name: String,
    model_name: String,
}

impl From<AllowedModelRow> for AllowedModel {
    fn from(row: AllowedModelRow) -> Self {
        AllowedModel {
            mapping_id: ModelMappingId::new(row.map_id),
            main_category_id: CaseMainCategoryId::new(row.case_main_category_id),
            phone_id: CasePhoneId::new(row.case_phone_id),
            model_id: CaseModelId::new(row.case_model_id),
            main_name: row.main_name,
            phone_name: row.phone_name,
            model_name: row.model_name,
        }
    }
}

/// Read a `{"type1": "static/..."}` map, skipping unknown type names.
pub(crate) fn type_images(raw: BTreeMap<String, Option<String>>, owner: &str) -> TypeImages {
    let (images, unknown) = TypeImages::from_raw(
        raw.into_iter()
            .filter_map(|(k, v)| image(v).map(|img| (k, img))),
    );
    for name in unknown {
        tracing::warn!(owner, type_name = %name, "skipping unknown image type");
    }
    images
}

/// Convert every row, failing on the first bad one.
pub(crate) fn convert<R, T>(
    rows: Vec<R>,
    f: impl Fn(R) -> Result<T, CommerceError>,
) -> Result<Vec<T>, CommerceError> {
    rows.into_iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_shapes() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("false"), false),
            (json!(null), false),
        ] {
            let row: MainCategoryRow =
                serde_json::from_value(json!({"id": 1, "name": "A", "image": null, "is_active": raw}))
                    .unwrap();
            assert_eq!(row.is_active, expected);
        }
    }

    #[test]
    fn test_shopper_product_row() {
        let row: ProductRow = serde_json::from_value(json!({
            "id": 7,
            "name": "20W Brick",
            "subtitle": null,
            "price": 499,
            "discount_percent": 10,
            "sub_category_id": 3,
            "image": "static/products/ab_white.png"
        }))
        .unwrap();
        let product = row.into_product(Currency::INR).unwrap();
        assert_eq!(product.price.amount_minor, 49_900);
        assert_eq!(product.discount.percent(), 10);
        assert!(product.is_available);
        assert_eq!(product.subtitle, "");
        assert_eq!(
            product.cover,
            Some(ImageRef::new("static/products/ab_white.png"))
        );
    }

    #[test]
    fn test_bad_discount_rejected() {
        let row: CaseProductRow = serde_json::from_value(json!({
            "id": 1, "title": "Armor", "price": 799, "discount_percent": 150, "is_active": 1
        }))
        .unwrap();
        assert!(row.into_case_product(Currency::INR).is_err());
    }

    #[test]
    fn test_type_images_skip_unknown() {
        let raw: BTreeMap<String, Option<String>> = serde_json::from_value(json!({
            "type1": "a.png",
            "type9": "b.png",
            "type2": null
        }))
        .unwrap();
        let images = type_images(raw, "product 4");
        assert_eq!(images.len(), 1);
        assert!(images.contains(VariantType::Type1));
    }

    #[test]
    fn test_map_result_already_mapped() {
        let result: MapResult =
            serde_json::from_value(json!({"message": "Already mapped"})).unwrap();
        assert!(result.id.is_none());
        assert_eq!(result.message, "Already mapped");
    }
}
