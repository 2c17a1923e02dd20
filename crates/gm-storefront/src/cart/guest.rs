//! Cart kept in the client store while nobody is signed in.

use super::CartBackend;
use async_trait::async_trait;
use gm_cache::{Cache, CacheError, Document};
use gm_commerce::cart::{Cart, CartKey, CartLine, ItemRef, LineDraft, LineSource, MAX_LINE_QUANTITY};
use gm_commerce::catalog::{Discount, ImageRef, VariantType};
use gm_commerce::ids::{CaseModelId, CaseProductId, ProductId};
use gm_commerce::{CommerceError, Currency, Money};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

fn one() -> u64 {
    1
}

/// A product line as the storefront pages persist it.
#[derive(Debug, Serialize, Deserialize)]
struct ProductRecord {
    id: u64,
    name: String,
    #[serde(default)]
    subtitle: String,
    price: Number,
    /// Present on records written with the list price.
    #[serde(default, skip_serializing)]
    discount_percent: Option<i64>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    selected_type: Option<String>,
    #[serde(default)]
    selected_type_image: Option<String>,
    #[serde(default = "one", alias = "quantity")]
    qty: u64,
}

/// A phone-case line.
#[derive(Debug, Serialize, Deserialize)]
struct CaseRecord {
    id: String,
    name: String,
    #[serde(default)]
    subtitle: String,
    price: Number,
    is_case: bool,
    case_product_id: u64,
    #[serde(default)]
    selected_type: Option<String>,
    #[serde(default)]
    selected_variant_image: Option<String>,
    #[serde(default)]
    selected_main: Option<u64>,
    #[serde(default)]
    selected_phone: Option<u64>,
    selected_model: u64,
    #[serde(default = "one", alias = "qty")]
    quantity: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GuestRecord {
    Case(CaseRecord),
    Product(ProductRecord),
}

fn clamp_quantity(raw: u64) -> u32 {
    u32::try_from(raw.clamp(1, u64::from(MAX_LINE_QUANTITY))).unwrap_or(MAX_LINE_QUANTITY)
}

/// "default", "" and unknown names read as no type.
fn parse_type(raw: Option<&str>) -> Option<VariantType> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "default" {
        return None;
    }
    match raw.parse() {
        Ok(t) => Some(t),
        Err(_) => {
            tracing::warn!(type_name = raw, "ignoring unknown selected type");
            None
        }
    }
}

fn image(path: Option<String>) -> Option<ImageRef> {
    path.filter(|p| !p.trim().is_empty()).map(ImageRef::new)
}

impl GuestRecord {
    fn into_line(self, currency: Currency) -> Result<CartLine, CommerceError> {
        match self {
            GuestRecord::Product(r) => {
                let mut price = Money::from_json_number(&r.price, currency)?;
                if let Some(percent) = r.discount_percent {
                    price = Discount::new(percent)?.apply(price);
                }
                Ok(CartLine {
                    item: ItemRef::product(ProductId::new(r.id)),
                    selected_type: parse_type(r.selected_type.as_deref()),
                    name: r.name,
                    image: image(r.selected_type_image).or_else(|| image(r.image)),
                    unit_price_at_add: price,
                    quantity: clamp_quantity(r.qty),
                    source: LineSource::Guest,
                })
            }
            GuestRecord::Case(r) => Ok(CartLine {
                item: ItemRef::case(
                    CaseProductId::new(r.case_product_id),
                    CaseModelId::new(r.selected_model),
                ),
                selected_type: parse_type(r.selected_type.as_deref()),
                name: r.name,
                image: image(r.selected_variant_image),
                unit_price_at_add: Money::from_json_number(&r.price, currency)?,
                quantity: clamp_quantity(r.quantity),
                source: LineSource::Guest,
            }),
        }
    }

    fn from_line(line: &CartLine) -> Self {
        let selected_type = line.selected_type.map(|t| t.as_str().to_string());
        let image = line.image.as_ref().map(|i| i.as_str().to_string());
        let price = line.unit_price_at_add.to_json_number();
        match line.item {
            ItemRef::Product { product_id } => GuestRecord::Product(ProductRecord {
                id: product_id.get(),
                name: line.name.clone(),
                subtitle: String::new(),
                price,
                discount_percent: None,
                image: image.clone(),
                selected_type,
                selected_type_image: image,
                qty: u64::from(line.quantity),
            }),
            ItemRef::Case {
                case_product_id,
                model_id,
            } => GuestRecord::Case(CaseRecord {
                id: format!(
                    "case_{case_product_id}_{model_id}_{}",
                    selected_type.as_deref().unwrap_or("default")
                ),
                name: line.name.clone(),
                subtitle: String::new(),
                price,
                is_case: true,
                case_product_id: case_product_id.get(),
                selected_type,
                selected_variant_image: image,
                selected_main: None,
                selected_phone: None,
                selected_model: model_id.get(),
                quantity: u64::from(line.quantity),
            }),
        }
    }
}

/// Guest cart persisted under one key of the client store.
///
/// Every call reads the stored records and writes them back, so two pages
/// sharing the store see each other's changes. A document that no longer
/// parses reads as an empty cart, and a single unreadable record is
/// skipped; both are logged. When the store rejects a write the call fails
/// with `Storage` and the stored cart is unchanged.
#[derive(Clone)]
pub struct GuestCart {
    doc: Document<Vec<Value>>,
    currency: Currency,
}

impl GuestCart {
    pub fn new(cache: Cache, key: impl Into<String>, currency: Currency) -> Self {
        Self {
            doc: Document::new(cache, key),
            currency,
        }
    }

    fn load(&self) -> Result<Cart, CommerceError> {
        let values = match self.doc.load() {
            Ok(values) => values,
            Err(CacheError::SerializeError(error)) => {
                tracing::warn!(key = self.doc.key(), %error, "guest cart unreadable, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut lines = Vec::with_capacity(values.len());
        for value in values {
            let parsed = serde_json::from_value::<GuestRecord>(value)
                .map_err(CommerceError::from)
                .and_then(|r| r.into_line(self.currency));
            match parsed {
                Ok(line) => lines.push(line),
                Err(error) => tracing::warn!(%error, "skipping unreadable cart record"),
            }
        }
        Ok(Cart::from_lines(self.currency, lines))
    }

    fn save(&self, cart: &Cart) -> Result<(), CommerceError> {
        let values = cart
            .lines()
            .iter()
            .map(|line| serde_json::to_value(GuestRecord::from_line(line)))
            .collect::<Result<Vec<_>, _>>()?;
        self.doc.save(&values)?;
        Ok(())
    }

    /// Lines as currently stored.
    pub fn lines(&self) -> Result<Vec<CartLine>, CommerceError> {
        Ok(self.load()?.into_lines())
    }
}

#[async_trait(?Send)]
impl CartBackend for GuestCart {
    async fn add(&self, draft: LineDraft, quantity: u32) -> Result<CartLine, CommerceError> {
        let mut cart = self.load()?;
        let line = cart.add(draft, quantity, LineSource::Guest)?.clone();
        self.save(&cart)?;
        Ok(line)
    }

    async fn update_quantity(
        &self,
        key: &CartKey,
        delta: i64,
    ) -> Result<Option<u32>, CommerceError> {
        let mut cart = self.load()?;
        let updated = cart.update_quantity(key, delta);
        if updated.is_some() {
            self.save(&cart)?;
        }
        Ok(updated)
    }

    async fn remove(&self, key: &CartKey) -> Result<bool, CommerceError> {
        let mut cart = self.load()?;
        let removed = cart.remove(key);
        if removed {
            self.save(&cart)?;
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<CartLine>, CommerceError> {
        self.lines()
    }

    async fn clear(&self) -> Result<(), CommerceError> {
        self.doc.clear()?;
        Ok(())
    }
}
