use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cafe_hex::application::gateway::PersistenceGateway;
use cafe_hex::application::storefront::Storefront;
use cafe_hex::errors::AppError;
use cafe_hex::outbound::UnconfiguredCompletion;
use cafe_repo::memory::{InMemoryDocumentStore, MemoryStore};
use cafe_types::domain::order::{ConnectionStatus, LOCAL_ORDER_PREFIX};
use cafe_types::ports::key_value_store::{KeyValueStore, StoreError};
use cafe_types::ports::remote_store::{CreatedDocument, Document, RemoteError, RemoteStore};
use chrono::Utc;
use tokio::sync::Notify;

async fn local_storefront() -> Storefront<MemoryStore> {
    let gateway = PersistenceGateway::new(MemoryStore::new(), None);
    Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await
}

#[derive(Default)]
struct SwitchableStore {
    inner: MemoryStore,
    broken: AtomicBool,
}

#[async_trait]
impl KeyValueStore for SwitchableStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("quota exceeded".into()));
        }
        self.inner.put(key, value).await
    }
}

/// Remote whose order writes park until released.
#[derive(Default)]
struct GatedRemote {
    entered: Notify,
    release: Notify,
    created: AtomicUsize,
}

#[async_trait]
impl RemoteStore for GatedRemote {
    async fn list(&self, _: &str) -> Result<Vec<Document>, RemoteError> {
        Ok(Vec::new())
    }

    async fn upsert(&self, _: &str, _: &str, _: serde_json::Value) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn create(
        &self,
        _: &str,
        _: serde_json::Value,
    ) -> Result<CreatedDocument, RemoteError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedDocument {
            id: "cloud-order-1".into(),
            created_at: Utc::now(),
        })
    }
}

// Espresso at 3.50 with the cloud unreachable: 3.78 total, saved locally.
#[tokio::test]
async fn espresso_checkout_with_remote_unavailable() {
    let remote = InMemoryDocumentStore::new();
    remote
        .fail_with(Some(RemoteError::Unavailable("offline".into())))
        .await;
    let remote_port: Arc<dyn RemoteStore> = Arc::new(remote.clone());
    let gateway = PersistenceGateway::new(MemoryStore::new(), Some(remote_port));
    let store = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;

    let cart = store.add_to_cart("1").await.unwrap();
    assert_eq!(cart.totals.total_cents, 378);

    let receipt = store.checkout().await.unwrap();
    assert_eq!(receipt.status, ConnectionStatus::Local);
    assert!(receipt.id.starts_with(LOCAL_ORDER_PREFIX));
    assert_eq!(receipt.message, format!("Order saved locally! ID: {}", receipt.id));

    assert!(store.cart().await.items.is_empty());
    let orders = store.local_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].draft.subtotal_cents, 350);
    assert_eq!(orders[0].draft.total_cents, 378);
    assert_eq!(store.status().await, ConnectionStatus::Local);
}

#[tokio::test]
async fn cloud_checkout_reports_cloud() {
    let remote = InMemoryDocumentStore::new();
    let remote_port: Arc<dyn RemoteStore> = Arc::new(remote.clone());
    let gateway = PersistenceGateway::new(MemoryStore::new(), Some(remote_port));
    let store = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;
    assert_eq!(store.status().await, ConnectionStatus::Cloud);

    store.add_to_cart("2").await.unwrap();
    store.add_to_cart("5").await.unwrap();
    let receipt = store.checkout().await.unwrap();
    assert_eq!(receipt.status, ConnectionStatus::Cloud);
    assert!(receipt.message.starts_with("Order synced to Cloud!"));
    assert!(store.local_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_checkout_keeps_cart_for_retry() {
    let local = SwitchableStore::default();
    local.broken.store(true, Ordering::SeqCst);
    let gateway = PersistenceGateway::new(local, None);
    let store = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;

    store.add_to_cart("3").await.unwrap();
    store.update_quantity("3", 2).await;
    let before = store.cart().await;

    let err = store.checkout().await.unwrap_err();
    assert!(matches!(err, AppError::CheckoutFailed(_)));
    assert_eq!(store.cart().await, before);
    assert_eq!(store.status().await, ConnectionStatus::Error);
}

#[tokio::test]
async fn retry_after_failure_succeeds() {
    let local = Arc::new(SwitchableStore::default());
    local.broken.store(true, Ordering::SeqCst);
    let gateway = PersistenceGateway::new(SharedStore(local.clone()), None);
    let store = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;

    store.add_to_cart("4").await.unwrap();
    assert!(store.checkout().await.is_err());

    local.broken.store(false, Ordering::SeqCst);
    let receipt = store.checkout().await.unwrap();
    assert_eq!(receipt.status, ConnectionStatus::Local);
    assert!(store.cart().await.items.is_empty());
}

struct SharedStore(Arc<SwitchableStore>);

#[async_trait]
impl KeyValueStore for SharedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.put(key, value).await
    }
}

#[tokio::test]
async fn empty_cart_checkout_is_rejected() {
    let store = local_storefront().await;
    let err = store.checkout().await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn second_checkout_while_in_flight_is_rejected() {
    let remote = Arc::new(GatedRemote::default());
    let remote_port: Arc<dyn RemoteStore> = remote.clone();
    let gateway = PersistenceGateway::new(MemoryStore::new(), Some(remote_port));
    let store = Arc::new(Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await);
    store.add_to_cart("1").await.unwrap();

    let first = tokio::spawn({
        let store = store.clone();
        async move { store.checkout().await }
    });
    remote.entered.notified().await;

    let second = store.checkout().await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    remote.release.notify_one();
    let receipt = first.await.unwrap().unwrap();
    assert_eq!(receipt.id, "cloud-order-1");
    assert_eq!(receipt.status, ConnectionStatus::Cloud);
    assert!(store.cart().await.items.is_empty());

    // The in-flight flag is released once the first checkout completes.
    let after = store.checkout().await;
    assert!(matches!(after, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn abandoned_checkout_still_completes_and_clears_cart() {
    let remote = Arc::new(GatedRemote::default());
    let remote_port: Arc<dyn RemoteStore> = remote.clone();
    let gateway = PersistenceGateway::new(MemoryStore::new(), Some(remote_port));
    let store = Storefront::open(gateway, Arc::new(UnconfiguredCompletion)).await;
    store.add_to_cart("1").await.unwrap();

    // The caller gives up while the order is still being written.
    let abandoned = tokio::time::timeout(Duration::from_millis(50), store.checkout()).await;
    assert!(abandoned.is_err());

    // Reading the cart is not held up by the pending placement.
    let cart = tokio::time::timeout(Duration::from_secs(1), store.cart())
        .await
        .expect("cart readable during checkout");
    assert_eq!(cart.items.len(), 1);

    // A retry while the first placement is pending cannot double-order.
    let retry = store.checkout().await;
    assert!(matches!(retry, Err(AppError::Conflict(_))));

    remote.release.notify_one();
    for _ in 0..100 {
        if store.cart().await.items.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(store.cart().await.items.is_empty());
    assert_eq!(remote.created.load(Ordering::SeqCst), 1);
    assert_eq!(store.status().await, ConnectionStatus::Cloud);

    // Once the placement finishes the in-flight flag is released.
    let mut after = store.checkout().await;
    for _ in 0..100 {
        if !matches!(after, Err(AppError::Conflict(_))) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        after = store.checkout().await;
    }
    assert!(matches!(after, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn cart_operations_through_the_storefront() {
    let store = local_storefront().await;

    let missing = store.add_to_cart("nope").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    store.add_to_cart("1").await.unwrap();
    store.add_to_cart("1").await.unwrap();
    let view = store.add_to_cart("8").await.unwrap();
    assert_eq!(view.item_count, 3);
    assert_eq!(view.totals.subtotal_cents, 2 * 350 + 325);

    let view = store.update_quantity("1", -10).await;
    assert_eq!(view.items[0].quantity, 1);

    let view = store.remove_from_cart("8").await;
    assert_eq!(view.items.len(), 1);
    let view = store.remove_from_cart("8").await;
    assert_eq!(view.items.len(), 1);
}
