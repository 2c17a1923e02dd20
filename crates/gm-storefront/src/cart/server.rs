//! Cart held by the API for a signed-in shopper.

use super::CartBackend;
use crate::catalog::CatalogStore;
use async_trait::async_trait;
use gm_auth::{Audience, AuthToken, Session};
use gm_commerce::cart::{
    Cart, CartKey, CartLine, ItemRef, LineDraft, LineSource, MAX_LINE_QUANTITY,
};
use gm_commerce::catalog::{ListFilter, Product, VariantType};
use gm_commerce::ids::ProductId;
use gm_commerce::{CommerceError, Currency};
use gm_data::{ClientRequestBuilder, FetchClient, Response};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A row of `GET /cart`.
#[derive(Debug, Deserialize)]
struct CartRow {
    product_id: u64,
    quantity: u32,
    #[serde(default)]
    type_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddBody {
    product_id: u64,
    quantity: u32,
    type_name: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct UpdateBody {
    product_id: u64,
    type_name: Option<&'static str>,
    delta: i64,
}

#[derive(Debug, Serialize)]
struct RemoveBody {
    type_name: Option<&'static str>,
}

/// Server-side cart behind the shopper token.
///
/// Lines are keyed by product and `type_name` as on the guest side, so two
/// types of one product are two lines. Rows carry no names, images or
/// prices; those come from the lines this client already showed and
/// otherwise from the catalog.
///
/// Mutations are checked against a copy of the current view, sent, and
/// applied to the view only once the server accepted them.
pub struct ServerCart {
    http: FetchClient,
    session: Session,
    catalog: Rc<dyn CatalogStore>,
    view: RefCell<Cart>,
}

impl ServerCart {
    pub fn new(
        http: FetchClient,
        session: Session,
        catalog: Rc<dyn CatalogStore>,
        currency: Currency,
    ) -> Self {
        Self {
            http,
            session,
            catalog,
            view: RefCell::new(Cart::new(currency)),
        }
    }

    /// The lines last read or written, without asking the server.
    pub fn view(&self) -> Vec<CartLine> {
        self.view.borrow().lines().to_vec()
    }

    /// Forget the cached lines.
    pub fn reset(&self) {
        let currency = self.view.borrow().currency();
        *self.view.borrow_mut() = Cart::new(currency);
    }

    fn token(&self) -> Result<AuthToken, CommerceError> {
        self.session
            .token(Audience::Shopper)
            .ok_or_else(|| CommerceError::Server {
                status: 401,
                message: "not signed in".to_string(),
            })
    }

    async fn send(&self, request: ClientRequestBuilder) -> Result<Response, CommerceError> {
        let request = request.bearer_auth(self.token()?);
        Ok(request.send().await?.error_for_status()?)
    }

    /// Read the server cart and rebuild the view from it.
    pub async fn refresh(&self) -> Result<Vec<CartLine>, CommerceError> {
        let rows: Vec<CartRow> = self.send(self.http.get("/cart")).await?.json()?;
        let products: HashMap<ProductId, Product> = self
            .catalog
            .list_all_products(ListFilter::ACTIVE)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let currency = self.view.borrow().currency();
        let mut previous = self.view();
        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let product_id = ProductId::new(row.product_id);
            let Some(product) = products.get(&product_id) else {
                tracing::warn!(%product_id, "cart product is no longer available, skipping");
                continue;
            };
            let item = ItemRef::product(product_id);
            let quantity = row.quantity.clamp(1, MAX_LINE_QUANTITY);

            // Rows without a type_name match any shown line of the product.
            let shown = match row.type_name.as_deref() {
                Some(raw) => {
                    let key = CartKey::new(item, parse_type(Some(raw)));
                    previous.iter().position(|l| l.key() == key)
                }
                None => previous.iter().position(|l| l.item == item),
            }
            .map(|i| previous.remove(i));

            let line = match shown {
                Some(shown) => CartLine {
                    name: product.name.clone(),
                    quantity,
                    ..shown
                },
                None => CartLine {
                    item,
                    selected_type: parse_type(row.type_name.as_deref()),
                    name: product.name.clone(),
                    image: product.cover.clone(),
                    unit_price_at_add: product.effective_price(),
                    quantity,
                    source: LineSource::Server,
                },
            };
            lines.push(line);
        }

        let cart = Cart::from_lines(currency, lines);
        let lines = cart.lines().to_vec();
        *self.view.borrow_mut() = cart;
        tracing::debug!(lines = lines.len(), "server cart refreshed");
        Ok(lines)
    }
}

fn parse_type(raw: Option<&str>) -> Option<VariantType> {
    raw.filter(|t| !t.trim().is_empty() && *t != "default")
        .and_then(|t| t.parse().ok())
}

fn product_of(item: &ItemRef) -> Result<ProductId, CommerceError> {
    item.product_id()
        .ok_or_else(|| CommerceError::invalid("cases cannot be added to the server cart"))
}

#[async_trait(?Send)]
impl CartBackend for ServerCart {
    async fn add(&self, draft: LineDraft, quantity: u32) -> Result<CartLine, CommerceError> {
        let product_id = product_of(&draft.item)?;
        self.view
            .borrow()
            .clone()
            .add(draft.clone(), quantity, LineSource::Server)?;

        let body = AddBody {
            product_id: product_id.get(),
            quantity,
            type_name: draft.selected_type.map(|t| t.as_str()),
        };
        self.send(self.http.post("/cart/add").json(&body)?).await?;

        let line = self
            .view
            .borrow_mut()
            .add(draft, quantity, LineSource::Server)?
            .clone();
        tracing::debug!(%product_id, quantity = line.quantity, "server cart add");
        Ok(line)
    }

    async fn update_quantity(
        &self,
        key: &CartKey,
        delta: i64,
    ) -> Result<Option<u32>, CommerceError> {
        let planned = {
            let view = self.view.borrow();
            let Some(current) = view.get(key).map(|l| l.quantity) else {
                return Ok(None);
            };
            let mut trial = view.clone();
            trial
                .update_quantity(key, delta)
                .map(|next| (current, next))
        };
        let Some((current, next)) = planned else {
            return Ok(None);
        };
        let effective = i64::from(next) - i64::from(current);
        if effective == 0 {
            return Ok(Some(next));
        }

        let product_id = product_of(&key.item)?;
        let body = UpdateBody {
            product_id: product_id.get(),
            type_name: key.selected_type.map(|t| t.as_str()),
            delta: effective,
        };
        self.send(self.http.post("/cart/update").json(&body)?).await?;

        let updated = self.view.borrow_mut().update_quantity(key, effective);
        tracing::debug!(%product_id, delta = effective, "server cart update");
        Ok(updated)
    }

    async fn remove(&self, key: &CartKey) -> Result<bool, CommerceError> {
        if self.view.borrow().get(key).is_none() {
            return Ok(false);
        }
        let product_id = product_of(&key.item)?;
        let body = RemoveBody {
            type_name: key.selected_type.map(|t| t.as_str()),
        };
        self.send(
            self.http
                .delete(format!("/cart/remove/{product_id}"))
                .json(&body)?,
        )
        .await?;

        tracing::debug!(%product_id, "server cart remove");
        Ok(self.view.borrow_mut().remove(key))
    }

    async fn list(&self) -> Result<Vec<CartLine>, CommerceError> {
        self.refresh().await
    }

    async fn clear(&self) -> Result<(), CommerceError> {
        let keys: Vec<CartKey> = self.view().iter().map(CartLine::key).collect();
        for key in keys {
            self.remove(&key).await?;
        }
        Ok(())
    }
}
