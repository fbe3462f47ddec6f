use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cafe_hex::application::catalog::fallback_menu;
use cafe_hex::application::gateway::{
    PersistenceGateway, MENU_CACHE_KEY, MENU_COLLECTION, ORDERS_COLLECTION,
};
use cafe_repo::memory::{InMemoryDocumentStore, MemoryStore};
use cafe_types::domain::cart::Cart;
use cafe_types::domain::menu::MenuItem;
use cafe_types::domain::order::{ConnectionStatus, LOCAL_ORDER_PREFIX};
use cafe_types::ports::key_value_store::{KeyValueStore, StoreError};
use cafe_types::ports::remote_store::{RemoteError, RemoteStore};
use serde_json::json;

fn gateway_with(
    local: MemoryStore,
    remote: &InMemoryDocumentStore,
) -> PersistenceGateway<MemoryStore> {
    let remote: Arc<dyn RemoteStore> = Arc::new(remote.clone());
    PersistenceGateway::new(local, Some(remote))
}

fn espresso_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(&fallback_menu()[0]);
    cart
}

async fn cached_menu(local: &MemoryStore) -> Option<Vec<MenuItem>> {
    let raw = local.get(MENU_CACHE_KEY).await.unwrap()?;
    Some(serde_json::from_str(&raw).unwrap())
}

/// Local store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    broken: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk unavailable".into()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".into()));
        }
        self.inner.put(key, value).await
    }
}

#[tokio::test]
async fn unconfigured_remote_serves_builtin_then_cached_menu() {
    let local = MemoryStore::new();
    let gateway = PersistenceGateway::new(local.clone(), None);
    assert!(!gateway.remote_usable());

    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Local);
    assert_eq!(load.items, fallback_menu());

    let cached = vec![fallback_menu()[2].clone()];
    local
        .put(MENU_CACHE_KEY, serde_json::to_string(&cached).unwrap())
        .await
        .unwrap();
    let load = gateway.fetch_menu().await;
    assert_eq!(load.items, cached);
}

#[tokio::test]
async fn corrupt_cache_falls_back_to_builtin_menu() {
    let local = MemoryStore::new();
    local.put(MENU_CACHE_KEY, "{not json".into()).await.unwrap();
    let gateway = PersistenceGateway::new(local, None);
    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Local);
    assert_eq!(load.items.len(), fallback_menu().len());
}

#[tokio::test]
async fn empty_remote_is_seeded_and_reported_as_cloud() {
    let local = MemoryStore::new();
    let remote = InMemoryDocumentStore::new();
    let gateway = gateway_with(local.clone(), &remote);

    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Cloud);
    assert_eq!(load.items, fallback_menu());
    assert_eq!(remote.documents(MENU_COLLECTION).len(), fallback_menu().len());
    assert_eq!(cached_menu(&local).await.unwrap(), fallback_menu());
}

#[tokio::test]
async fn remote_menu_overwrites_cache_and_ids_come_from_documents() {
    let local = MemoryStore::new();
    local.put(MENU_CACHE_KEY, "[]".into()).await.unwrap();
    let remote = InMemoryDocumentStore::new();
    remote
        .upsert(
            MENU_COLLECTION,
            "cortado",
            json!({
                "id": "ignored",
                "name": "Cortado",
                "description": "Equal parts espresso and warm milk",
                "price_cents": 400,
                "category": "Hot Coffee",
                "image": "cortado.jpg",
                "tags": ["strong"]
            }),
        )
        .await
        .unwrap();
    remote
        .upsert(MENU_COLLECTION, "broken", json!({"name": "No price"}))
        .await
        .unwrap();

    let gateway = gateway_with(local.clone(), &remote);
    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Cloud);
    assert_eq!(load.items.len(), 1);
    assert_eq!(load.items[0].id, "cortado");
    assert_eq!(cached_menu(&local).await.unwrap(), load.items);
}

#[tokio::test]
async fn unusable_remote_documents_degrade_to_local() {
    let remote = InMemoryDocumentStore::new();
    remote
        .upsert(MENU_COLLECTION, "x", json!({"price_cents": -3}))
        .await
        .unwrap();
    let gateway = gateway_with(MemoryStore::new(), &remote);
    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Local);
    assert!(!load.items.is_empty());
}

#[tokio::test]
async fn transient_failure_is_not_sticky() {
    let remote = InMemoryDocumentStore::new();
    remote
        .fail_with(Some(RemoteError::Unavailable("timeout".into())))
        .await;
    let gateway = gateway_with(MemoryStore::new(), &remote);

    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Local);
    assert_eq!(load.items, fallback_menu());
    assert!(gateway.remote_usable());

    remote.fail_with(None).await;
    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Cloud);
}

#[tokio::test]
async fn permission_denied_stops_remote_access() {
    let remote = InMemoryDocumentStore::new();
    remote
        .fail_with(Some(RemoteError::PermissionDenied("rules".into())))
        .await;
    let gateway = gateway_with(MemoryStore::new(), &remote);

    assert_eq!(gateway.fetch_menu().await.status, ConnectionStatus::Local);
    assert!(!gateway.remote_usable());
    let calls = remote.calls();

    remote.fail_with(None).await;
    assert_eq!(gateway.fetch_menu().await.status, ConnectionStatus::Local);
    let cart = espresso_cart();
    let placed = gateway.place_order(cart.items(), cart.totals()).await.unwrap();
    assert_eq!(placed.status, ConnectionStatus::Local);
    assert_eq!(remote.calls(), calls);
}

#[tokio::test]
async fn cloud_order_gets_remote_id() {
    let local = MemoryStore::new();
    let remote = InMemoryDocumentStore::new();
    let gateway = gateway_with(local, &remote);
    let cart = espresso_cart();

    let placed = gateway.place_order(cart.items(), cart.totals()).await.unwrap();
    assert_eq!(placed.status, ConnectionStatus::Cloud);
    assert!(!placed.id.starts_with(LOCAL_ORDER_PREFIX));

    let docs = remote.documents(ORDERS_COLLECTION);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, placed.id);
    assert_eq!(docs[0].fields["total_cents"], 378);
    assert_eq!(docs[0].fields["status"], "pending");
    assert!(gateway.local_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_cloud_write_lands_in_local_log() {
    let remote = InMemoryDocumentStore::new();
    remote
        .fail_with(Some(RemoteError::Unavailable("502".into())))
        .await;
    let gateway = gateway_with(MemoryStore::new(), &remote);
    let cart = espresso_cart();

    let first = gateway.place_order(cart.items(), cart.totals()).await.unwrap();
    let second = gateway.place_order(cart.items(), cart.totals()).await.unwrap();
    assert_eq!(first.status, ConnectionStatus::Local);
    assert!(first.id.starts_with(LOCAL_ORDER_PREFIX));
    assert_ne!(first.id, second.id);

    let log = gateway.local_orders().await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].id, first.id);
    assert!(log.iter().all(|o| o.is_local() && o.draft.total_cents == 378));
}

#[tokio::test]
async fn broken_local_store_fails_orders_but_not_menu() {
    let local = FlakyStore::default();
    local.broken.store(true, Ordering::SeqCst);
    let gateway = PersistenceGateway::new(local, None);

    let load = gateway.fetch_menu().await;
    assert_eq!(load.status, ConnectionStatus::Local);
    assert_eq!(load.items, fallback_menu());

    let cart = espresso_cart();
    assert!(gateway.place_order(cart.items(), cart.totals()).await.is_err());
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let gateway = PersistenceGateway::new(MemoryStore::new(), None);
    let cart = Cart::new();
    assert!(gateway.place_order(cart.items(), cart.totals()).await.is_err());
    assert!(gateway.local_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_fallback_menu_seeds_remote() {
    let remote = InMemoryDocumentStore::new();
    let menu = vec![fallback_menu()[3].clone()];
    let gateway = gateway_with(MemoryStore::new(), &remote).with_fallback_menu(menu.clone());
    let load = gateway.fetch_menu().await;
    assert_eq!(load.items, menu);
    assert_eq!(remote.documents(MENU_COLLECTION).len(), 1);
}
