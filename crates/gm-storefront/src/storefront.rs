//! Everything a storefront page needs, wired from one config.

use crate::cart::{CartSession, GuestCart, MergeReport, ServerCart};
use crate::catalog::{CatalogStore, RemoteCatalog};
use crate::config::StorefrontConfig;
use anyhow::{Context, Result};
use gm_auth::{AuthClient, AuthError, Credentials, Session, UserProfile};
use gm_cache::Cache;
use gm_commerce::cart::{CartLine, ItemRef, LineDraft};
use gm_commerce::catalog::{EntityKind, ImageRef, ListFilter, VariantType};
use gm_commerce::CommerceError;
use gm_data::{FetchClient, Transport};
use std::rc::Rc;

/// The catalog, auth and cart services sharing one session.
///
/// ```rust,ignore
/// let shop = Storefront::connect(StorefrontConfig::default(), transport, Cache::open_default()?)?;
/// shop.add_to_cart(ItemRef::product(id), Some(VariantType::Type1), 1).await?;
/// let (user, report) = shop.login(&Credentials::new("asha@example.in", "secret")).await?;
/// ```
pub struct Storefront {
    config: StorefrontConfig,
    session: Session,
    auth: AuthClient,
    catalog: Rc<dyn CatalogStore>,
    cart: CartSession,
}

impl Storefront {
    /// Restore the session from `cache` and build the services.
    pub fn connect(
        config: StorefrontConfig,
        transport: Rc<dyn Transport>,
        cache: Cache,
    ) -> Result<Self> {
        let session = Session::init(cache.clone(), config.storage.clone())
            .context("Failed to restore session")?;
        let http = FetchClient::new(transport).with_base_url(config.api_base_url.clone());
        let currency = config.currency;

        let catalog: Rc<dyn CatalogStore> = Rc::new(RemoteCatalog::new(
            http.clone(),
            session.clone(),
            currency,
        ));
        let auth = AuthClient::new(http.clone(), session.clone());
        let cart = CartSession::new(
            GuestCart::new(cache, config.storage.cart.clone(), currency),
            ServerCart::new(http, session.clone(), catalog.clone(), currency),
            session.clone(),
            currency,
        );

        tracing::debug!(api = %config.api_base_url, mode = ?cart.mode(), "storefront ready");
        Ok(Self {
            config,
            session,
            auth,
            catalog,
            cart,
        })
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn catalog(&self) -> &Rc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn cart(&self) -> &CartSession {
        &self.cart
    }

    pub fn media_url(&self, image: &ImageRef) -> String {
        self.config.media_url(image)
    }

    /// Sign the shopper in, then move the guest cart to the server.
    ///
    /// Once the credentials are accepted the login stands, whatever the
    /// merge does; see the returned [`MergeReport`].
    pub async fn login(&self, credentials: &Credentials) -> Result<(UserProfile, MergeReport)> {
        let user = self.auth.login(credentials).await.context("Login failed")?;
        let report = self.cart.complete_login().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "guest cart not merged after login");
            MergeReport::default()
        });
        Ok((user, report))
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        let result = self.auth.logout();
        self.cart.logged_out();
        result
    }

    /// Add a shopper-visible product or case to the cart.
    ///
    /// The draft is built from the live catalog, so the line carries the
    /// current effective price and the image of the selected type.
    pub async fn add_to_cart(
        &self,
        item: ItemRef,
        selected_type: Option<VariantType>,
        quantity: u32,
    ) -> Result<CartLine, CommerceError> {
        let draft = self.draft(item, selected_type).await?;
        self.cart.add(draft, quantity).await
    }

    async fn draft(
        &self,
        item: ItemRef,
        selected_type: Option<VariantType>,
    ) -> Result<LineDraft, CommerceError> {
        match item {
            ItemRef::Product { product_id } => {
                let product = self
                    .catalog
                    .list_all_products(ListFilter::ACTIVE)
                    .await?
                    .into_iter()
                    .find(|p| p.id == product_id)
                    .ok_or_else(|| EntityKind::Product.not_found(product_id))?;
                let images = self.catalog.get_type_images(product_id).await?;
                LineDraft::for_product(&product, &images, selected_type)
            }
            ItemRef::Case {
                case_product_id,
                model_id,
            } => {
                let product = self
                    .catalog
                    .list_case_products(ListFilter::ACTIVE)
                    .await?
                    .into_iter()
                    .find(|p| p.id == case_product_id)
                    .ok_or_else(|| EntityKind::CaseProduct.not_found(case_product_id))?;
                let variants = self.catalog.case_variant_images(case_product_id).await?;
                let allowed = self.catalog.list_allowed_models(case_product_id).await?;
                LineDraft::for_case(&product, &variants, &allowed, model_id, selected_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_commerce::cart::Selection;
    use gm_commerce::ids::{CaseModelId, CaseProductId, ProductId};
    use gm_commerce::{Currency, Money};
    use gm_data::testing::MockTransport;
    use gm_data::Method;
    use serde_json::json;

    fn shop(mock: &Rc<MockTransport>, cache: Cache) -> Storefront {
        mock.respond_json(
            Method::Get,
            "/catalog/products",
            200,
            &json!([{
                "id": 7, "name": "20W Brick", "subtitle": "USB-C", "price": 500,
                "discount_percent": 20, "sub_category_id": 2,
                "image": "static/products/brick_1.png"
            }]),
        );
        mock.respond_json(
            Method::Get,
            "/admin/catalog/product/7/type-images",
            200,
            &json!({"type1": "static/products/brick_1.png", "type2": "static/products/brick_2.png"}),
        );
        mock.respond_json(
            Method::Get,
            "/cases/products",
            200,
            &json!([{"id": 3, "title": "Armor", "subtitle": "", "price": 600, "discount_percent": 0}]),
        );
        mock.respond_json(
            Method::Get,
            "/cases/product/3/variants",
            200,
            &json!({"type1": "static/cases/armor_1.png"}),
        );
        mock.respond_json(
            Method::Get,
            "/cases/product/3/allowed-models",
            200,
            &json!([{
                "map_id": 1, "case_main_category_id": 1, "case_phone_id": 2, "case_model_id": 9,
                "main_name": "Apple", "phone_name": "iPhone", "model_name": "15 Pro"
            }]),
        );
        Storefront::connect(StorefrontConfig::default(), mock.clone(), cache).unwrap()
    }

    #[tokio::test]
    async fn test_guest_add_builds_draft_from_catalog() {
        let mock = Rc::new(MockTransport::new());
        let shop = shop(&mock, Cache::in_memory());

        let line = shop
            .add_to_cart(ItemRef::product(ProductId::new(7)), Some(VariantType::Type2), 1)
            .await
            .unwrap();
        assert_eq!(line.unit_price_at_add, Money::new(40_000, Currency::INR));
        assert_eq!(line.image, Some(ImageRef::new("static/products/brick_2.png")));

        let err = shop
            .add_to_cart(ItemRef::product(ProductId::new(7)), None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));

        let err = shop
            .add_to_cart(ItemRef::product(ProductId::new(8)), None, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_case_needs_allowed_model() {
        let mock = Rc::new(MockTransport::new());
        let shop = shop(&mock, Cache::in_memory());

        let line = shop
            .add_to_cart(
                ItemRef::case(CaseProductId::new(3), CaseModelId::new(9)),
                Some(VariantType::Type1),
                1,
            )
            .await
            .unwrap();
        assert_eq!(line.name, "Armor (iPhone / 15 Pro)");

        let err = shop
            .add_to_cart(
                ItemRef::case(CaseProductId::new(3), CaseModelId::new(10)),
                Some(VariantType::Type1),
                1,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_login_merges_guest_cart() {
        let mock = Rc::new(MockTransport::new());
        let cache = Cache::in_memory();
        let shop = shop(&mock, cache.clone());
        mock.respond_json(
            Method::Post,
            "/auth/login",
            200,
            &json!({
                "token": "tok-9",
                "user": {"id": 4, "name": "Asha", "email": "asha@example.in"}
            }),
        );
        mock.respond_json(Method::Post, "/cart/add", 200, &json!({"message": "Added to cart"}));
        mock.respond_json(
            Method::Get,
            "/cart",
            200,
            &json!([{"id": 1, "user_id": 4, "product_id": 7, "quantity": 2}]),
        );

        shop.add_to_cart(ItemRef::product(ProductId::new(7)), Some(VariantType::Type1), 2)
            .await
            .unwrap();
        let (user, report) = shop
            .login(&Credentials::new("asha@example.in", "secret"))
            .await
            .unwrap();

        assert_eq!(user.name, "Asha");
        assert!(report.is_complete());
        assert!(cache.get::<serde_json::Value>("cart").unwrap().is_none());

        let lines = shop.cart().list().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].selected_type, Some(VariantType::Type1));
        let total = shop
            .cart()
            .total_selected(&Selection::all(&lines))
            .await
            .unwrap();
        assert_eq!(total, Money::new(80_000, Currency::INR));

        shop.logout().unwrap();
        assert!(!shop.session().is_authenticated());
        assert!(shop.cart().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_stands_when_guest_store_is_stuck() {
        use gm_cache::{CacheError, KvStore, MemoryStore};

        struct StuckCart(MemoryStore);

        impl KvStore for StuckCart {
            fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
                self.0.get(key)
            }

            fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
                self.0.set(key, value)
            }

            fn delete(&self, key: &str) -> Result<(), CacheError> {
                if key == "cart" {
                    return Err(CacheError::StoreError("storage locked".into()));
                }
                self.0.delete(key)
            }

            fn keys(&self) -> Result<Vec<String>, CacheError> {
                self.0.keys()
            }
        }

        let mock = Rc::new(MockTransport::new());
        let shop = shop(&mock, Cache::new(StuckCart(MemoryStore::new())));
        mock.respond_json(
            Method::Post,
            "/auth/login",
            200,
            &json!({
                "token": "tok-9",
                "user": {"id": 4, "name": "Asha", "email": "asha@example.in"}
            }),
        );
        mock.respond_json(Method::Post, "/cart/add", 200, &json!({"message": "Added to cart"}));

        shop.add_to_cart(ItemRef::product(ProductId::new(7)), Some(VariantType::Type1), 1)
            .await
            .unwrap();
        let (user, report) = shop
            .login(&Credentials::new("asha@example.in", "secret"))
            .await
            .unwrap();

        assert_eq!(user.id.get(), 4);
        assert!(shop.session().is_authenticated());
        assert_eq!(report.merged.len(), 1);
        assert!(!report.cleared);
        assert_eq!(mock.requests_to(Method::Post, "/cart/add").len(), 1);
    }

    #[test]
    fn test_connect_restores_session() {
        let cache = Cache::in_memory();
        cache.set_text("user_token", "tok-1").unwrap();
        cache
            .set(
                "user",
                &json!({"id": 1, "name": "Asha", "email": "asha@example.in"}),
            )
            .unwrap();

        let mock = Rc::new(MockTransport::new());
        let shop = Storefront::connect(StorefrontConfig::default(), mock, cache).unwrap();
        assert!(shop.session().is_authenticated());
        assert_eq!(
            shop.media_url(&ImageRef::new("static/cases/a.png")),
            "http://localhost:8000/static/cases/a.png"
        );
    }
}
