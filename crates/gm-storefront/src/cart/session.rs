//! Switching between the guest and server carts.

use super::{CartBackend, GuestCart, ServerCart};
use futures::future::join_all;
use gm_auth::Session;
use gm_commerce::cart::{total_selected, CartKey, CartLine, LineDraft, Selection};
use gm_commerce::{CommerceError, Currency, Money};

/// Which store the cart currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    Guest,
    Authenticated,
}

/// Outcome of moving the guest cart to the server after login.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Lines the server accepted.
    pub merged: Vec<CartLine>,
    /// Lines the server refused, with the reason. They are gone from the
    /// guest store too; the caller may offer to add them again.
    pub failed: Vec<(CartLine, CommerceError)>,
    /// Whether the guest store was emptied. When false the same lines may
    /// be merged again on the next login.
    pub cleared: bool,
}

impl MergeReport {
    /// Every line merged and the guest store emptied.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.cleared
    }
}

/// The shopper's cart, in whichever store the session calls for.
///
/// Signed out, every call goes to the [`GuestCart`]; signed in, to the
/// [`ServerCart`]. The mode follows the [`Session`], so signing in
/// elsewhere is picked up on the next call.
pub struct CartSession {
    guest: GuestCart,
    server: ServerCart,
    session: Session,
    currency: Currency,
}

impl CartSession {
    pub fn new(guest: GuestCart, server: ServerCart, session: Session, currency: Currency) -> Self {
        Self {
            guest,
            server,
            session,
            currency,
        }
    }

    pub fn mode(&self) -> CartMode {
        if self.session.is_authenticated() {
            CartMode::Authenticated
        } else {
            CartMode::Guest
        }
    }

    fn backend(&self) -> &dyn CartBackend {
        match self.mode() {
            CartMode::Guest => &self.guest,
            CartMode::Authenticated => &self.server,
        }
    }

    pub async fn add(&self, draft: LineDraft, quantity: u32) -> Result<CartLine, CommerceError> {
        self.backend().add(draft, quantity).await
    }

    pub async fn update_quantity(
        &self,
        key: &CartKey,
        delta: i64,
    ) -> Result<Option<u32>, CommerceError> {
        self.backend().update_quantity(key, delta).await
    }

    pub async fn remove(&self, key: &CartKey) -> Result<bool, CommerceError> {
        self.backend().remove(key).await
    }

    pub async fn list(&self) -> Result<Vec<CartLine>, CommerceError> {
        self.backend().list().await
    }

    pub async fn clear(&self) -> Result<(), CommerceError> {
        self.backend().clear().await
    }

    /// Total of the selected lines.
    pub async fn total_selected(&self, selection: &Selection) -> Result<Money, CommerceError> {
        let lines = self.list().await?;
        total_selected(&lines, selection, self.currency)
    }

    /// Sum of quantities, for the header badge.
    pub async fn item_count(&self) -> Result<u64, CommerceError> {
        Ok(self
            .list()
            .await?
            .iter()
            .map(|l| u64::from(l.quantity))
            .sum())
    }

    /// Move the guest cart to the server. Call right after a successful
    /// login.
    ///
    /// Every guest line becomes one concurrent add. A refused line is
    /// logged and reported but does not stop the others. The guest store is
    /// cleared once all adds have settled, whatever their outcome.
    ///
    /// Only a missing session is an error. A guest store that cannot be
    /// read or cleared is logged and shows up in the report.
    pub async fn complete_login(&self) -> Result<MergeReport, CommerceError> {
        if self.mode() != CartMode::Authenticated {
            return Err(CommerceError::invalid("complete_login needs a signed-in shopper"));
        }

        let lines = self.guest.lines().unwrap_or_else(|error| {
            tracing::warn!(%error, "guest cart unreadable, nothing to merge");
            Vec::new()
        });
        let adds = lines.iter().map(|line| {
            let draft = LineDraft {
                item: line.item,
                selected_type: line.selected_type,
                name: line.name.clone(),
                image: line.image.clone(),
                unit_price: line.unit_price_at_add,
            };
            self.server.add(draft, line.quantity)
        });
        let results = join_all(adds).await;

        let mut report = MergeReport::default();
        for (line, result) in lines.into_iter().zip(results) {
            match result {
                Ok(merged) => report.merged.push(merged),
                Err(error) => {
                    tracing::warn!(item = ?line.item, %error, "guest cart line not merged");
                    report.failed.push((line, error));
                }
            }
        }

        match self.guest.clear().await {
            Ok(()) => report.cleared = true,
            Err(error) => tracing::warn!(%error, "guest cart not cleared after merge"),
        }
        tracing::info!(
            merged = report.merged.len(),
            failed = report.failed.len(),
            cleared = report.cleared,
            "guest cart merged"
        );
        Ok(report)
    }

    /// Drop back to the guest cart after the session was torn down.
    pub fn logged_out(&self) {
        self.server.reset();
        tracing::info!("cart back in guest mode");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::fake_server::{row, serve_cart};
    use crate::catalog::{CatalogStore, MemoryCatalog};
    use crate::images::MemoryImageStore;
    use gm_auth::{AuthToken, StorageKeys, UserProfile};
    use gm_cache::{Cache, CacheError, KvStore, MemoryStore};
    use gm_commerce::cart::ItemRef;
    use gm_commerce::catalog::{ImageRef, Product, ProductInput, VariantType};
    use gm_commerce::ids::{CaseModelId, CaseProductId, UserId};
    use gm_data::testing::MockTransport;
    use gm_data::{FetchClient, Method, Response};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        mock: Rc<MockTransport>,
        session: Session,
        cart: CartSession,
        products: Vec<Product>,
        added: Rc<RefCell<Vec<u64>>>,
    }

    /// A store whose guest cart key cannot be deleted.
    struct StuckCart {
        inner: MemoryStore,
    }

    impl KvStore for StuckCart {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), CacheError> {
            if key == "cart" {
                return Err(CacheError::StoreError("storage locked".into()));
            }
            self.inner.delete(key)
        }

        fn keys(&self) -> Result<Vec<String>, CacheError> {
            self.inner.keys()
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(Session::in_memory()).await
    }

    async fn fixture_with(session: Session) -> Fixture {
        let mock = Rc::new(MockTransport::new());
        let added = Rc::new(RefCell::new(Vec::new()));
        let log = added.clone();
        mock.route(Method::Post, "/cart/add", move |req| {
            let body: serde_json::Value = req.json()?;
            let pid = body["product_id"].as_u64().unwrap_or(0);
            if pid == 13 {
                return Response::with_json(400, &json!({"detail": "out of stock"}));
            }
            log.borrow_mut().push(pid);
            Response::with_json(200, &json!({"message": "Added to cart"}))
        });

        let catalog = Rc::new(MemoryCatalog::new(
            Currency::INR,
            Rc::new(MemoryImageStore::new()),
        ));
        let main = catalog.create_main_category("Audio", None).await.unwrap();
        let sub = catalog.create_sub_category(main.id, "Buds", None).await.unwrap();
        let mut products = Vec::new();
        for (name, price) in [("Buds Lite", "999"), ("Buds Pro", "2499")] {
            products.push(
                catalog
                    .create_product(&ProductInput::new(sub.id, name, price))
                    .await
                    .unwrap(),
            );
        }

        let cache: Cache = session.cache().clone();
        let http = FetchClient::new(mock.clone()).with_base_url("http://localhost:8000");
        let guest = GuestCart::new(cache, session.keys().cart.clone(), Currency::INR);
        let server = ServerCart::new(http, session.clone(), catalog, Currency::INR);
        let cart = CartSession::new(guest, server, session.clone(), Currency::INR);

        Fixture {
            mock,
            session,
            cart,
            products,
            added,
        }
    }

    fn sign_in(session: &Session) {
        session
            .sign_in(
                UserProfile {
                    id: UserId::new(1),
                    name: "Asha".into(),
                    email: "asha@example.in".into(),
                },
                AuthToken::new("tok-1").unwrap(),
            )
            .unwrap();
    }

    fn draft(product: &Product) -> LineDraft {
        LineDraft {
            item: ItemRef::product(product.id),
            selected_type: None,
            name: product.name.clone(),
            image: None,
            unit_price: product.effective_price(),
        }
    }

    #[tokio::test]
    async fn test_guest_mode_stays_local() {
        let f = fixture().await;
        assert_eq!(f.cart.mode(), CartMode::Guest);

        f.cart.add(draft(&f.products[0]), 2).await.unwrap();
        f.cart.add(draft(&f.products[1]), 1).await.unwrap();

        assert_eq!(f.cart.item_count().await.unwrap(), 3);
        let lines = f.cart.list().await.unwrap();
        let total = f.cart.total_selected(&Selection::all(&lines)).await.unwrap();
        assert_eq!(total, Money::new(449_700, Currency::INR));
        assert!(f.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_merge_sends_each_line_and_clears_guest() {
        let f = fixture().await;
        f.cart.add(draft(&f.products[0]), 2).await.unwrap();
        f.cart.add(draft(&f.products[1]), 1).await.unwrap();

        sign_in(&f.session);
        let report = f.cart.complete_login().await.unwrap();

        assert!(report.is_complete());
        assert!(report.cleared);
        assert_eq!(report.merged.len(), 2);
        let mut added = f.added.borrow().clone();
        added.sort_unstable();
        let mut expected: Vec<u64> = f.products.iter().map(|p| p.id.get()).collect();
        expected.sort_unstable();
        assert_eq!(added, expected);
        assert!(f.cart.guest.lines().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_reports_failures_and_still_clears() {
        let f = fixture().await;
        f.cart.add(draft(&f.products[0]), 1).await.unwrap();

        let mut refused = draft(&f.products[1]);
        refused.item = ItemRef::product(gm_commerce::ids::ProductId::new(13));
        f.cart.add(refused, 1).await.unwrap();

        let mut case = draft(&f.products[1]);
        case.item = ItemRef::case(CaseProductId::new(4), CaseModelId::new(8));
        f.cart.add(case, 1).await.unwrap();

        sign_in(&f.session);
        let report = f.cart.complete_login().await.unwrap();

        assert_eq!(report.merged.len(), 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report
            .failed
            .iter()
            .any(|(_, e)| matches!(e, CommerceError::Server { status: 400, .. })));
        assert!(report
            .failed
            .iter()
            .any(|(_, e)| matches!(e, CommerceError::InvalidArgument(_))));
        assert!(f.cart.guest.lines().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_login_requires_session() {
        let f = fixture().await;
        f.cart.add(draft(&f.products[0]), 1).await.unwrap();

        let err = f.cart.complete_login().await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidArgument(_)));
        assert_eq!(f.cart.guest.lines().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_returns_to_guest() {
        let f = fixture().await;
        sign_in(&f.session);
        assert_eq!(f.cart.mode(), CartMode::Authenticated);

        f.cart.add(draft(&f.products[0]), 1).await.unwrap();
        f.session.teardown().unwrap();
        f.cart.logged_out();

        assert_eq!(f.cart.mode(), CartMode::Guest);
        assert!(f.cart.server.view().is_empty());
        assert!(f.cart.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_keeps_selected_types() {
        let f = fixture().await;
        let rows = serve_cart(&f.mock);
        let (a, b) = (&f.products[0], &f.products[1]);

        let typed = |product: &Product, t: VariantType| LineDraft {
            selected_type: Some(t),
            image: Some(ImageRef::new(format!("static/products/{t}.png"))),
            ..draft(product)
        };
        f.cart.add(typed(a, VariantType::Type1), 2).await.unwrap();
        f.cart.add(typed(b, VariantType::Type2), 1).await.unwrap();

        sign_in(&f.session);
        let report = f.cart.complete_login().await.unwrap();
        assert!(report.is_complete());

        let mut server = rows.borrow().clone();
        server.sort();
        let mut expected = vec![
            row(a.id.get(), Some("type1"), 2),
            row(b.id.get(), Some("type2"), 1),
        ];
        expected.sort();
        assert_eq!(server, expected);

        let lines = f.cart.list().await.unwrap();
        let mut seen: Vec<_> = lines
            .iter()
            .map(|l| (l.item, l.selected_type, l.quantity))
            .collect();
        seen.sort();
        let mut expected = vec![
            (ItemRef::product(a.id), Some(VariantType::Type1), 2),
            (ItemRef::product(b.id), Some(VariantType::Type2), 1),
        ];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_merge_survives_stuck_guest_store() {
        let store = StuckCart {
            inner: MemoryStore::new(),
        };
        let session = Session::init(Cache::new(store), StorageKeys::default()).unwrap();
        let f = fixture_with(session).await;
        f.cart.add(draft(&f.products[0]), 1).await.unwrap();

        sign_in(&f.session);
        let report = f.cart.complete_login().await.unwrap();

        assert_eq!(report.merged.len(), 1);
        assert!(report.failed.is_empty());
        assert!(!report.cleared);
        assert!(!report.is_complete());
        assert_eq!(*f.added.borrow(), vec![f.products[0].id.get()]);
        assert_eq!(f.cart.guest.lines().unwrap().len(), 1);
    }
}
