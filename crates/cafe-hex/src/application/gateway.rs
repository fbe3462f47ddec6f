use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cafe_types::domain::cart::{CartItem, Totals};
use cafe_types::domain::menu::MenuItem;
use cafe_types::domain::order::{
    ConnectionStatus, Order, OrderDraft, PlacedOrder, LOCAL_ORDER_PREFIX,
};
use cafe_types::ports::key_value_store::{KeyValueStore, StoreError};
use cafe_types::ports::remote_store::{CreatedDocument, RemoteError, RemoteStore};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::application::catalog;

pub const MENU_COLLECTION: &str = "menu";
pub const ORDERS_COLLECTION: &str = "orders";
pub const MENU_CACHE_KEY: &str = "cafe_menu";
pub const ORDERS_LOG_KEY: &str = "cafe_orders";

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("local orders log is unreadable: {0}")]
    CorruptLog(#[source] serde_json::Error),

    #[error("failed to encode orders log: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLoad {
    pub items: Vec<MenuItem>,
    pub status: ConnectionStatus,
}

/// Decides whether menu and order data live in the cloud document store or
/// in the local key-value fallback.
///
/// The remote is consulted only when one was configured and it has not
/// answered permission-denied earlier; otherwise every call goes local.
pub struct PersistenceGateway<L: KeyValueStore> {
    local: L,
    remote: Option<Arc<dyn RemoteStore>>,
    remote_disabled: AtomicBool,
    fallback_menu: Vec<MenuItem>,
    orders_log: Mutex<()>,
}

impl<L: KeyValueStore> PersistenceGateway<L> {
    pub fn new(local: L, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self {
            local,
            remote,
            remote_disabled: AtomicBool::new(false),
            fallback_menu: catalog::fallback_menu(),
            orders_log: Mutex::new(()),
        }
    }

    /// Replaces the built-in menu used for seeding and as the last resort.
    /// An empty list keeps the built-in one.
    pub fn with_fallback_menu(mut self, items: Vec<MenuItem>) -> Self {
        if !items.is_empty() {
            self.fallback_menu = items;
        }
        self
    }

    pub fn remote_usable(&self) -> bool {
        self.remote.is_some() && !self.remote_disabled.load(Ordering::SeqCst)
    }

    fn remote(&self) -> Option<&dyn RemoteStore> {
        if self.remote_disabled.load(Ordering::SeqCst) {
            return None;
        }
        self.remote.as_deref()
    }

    fn note_remote_failure(&self, op: &str, err: &RemoteError) {
        match err {
            RemoteError::PermissionDenied(detail) => {
                info!(op, %detail, "remote permission denied, operating in local mode");
                self.remote_disabled.store(true, Ordering::SeqCst);
            }
            other => warn!(op, error = %other, "remote store failed, falling back to local"),
        }
    }

    /// Loads the catalog. Never fails: every path ends in a non-empty list
    /// and a status.
    #[instrument(skip(self))]
    pub async fn fetch_menu(&self) -> MenuLoad {
        let Some(remote) = self.remote() else {
            debug!("remote not usable, serving local menu");
            return MenuLoad {
                items: self.local_menu().await,
                status: ConnectionStatus::Local,
            };
        };

        match self.fetch_remote_menu(remote).await {
            Ok(items) => {
                self.cache_menu(&items).await;
                MenuLoad {
                    items,
                    status: ConnectionStatus::Cloud,
                }
            }
            Err(err) => {
                self.note_remote_failure("fetch_menu", &err);
                MenuLoad {
                    items: self.local_menu().await,
                    status: ConnectionStatus::Local,
                }
            }
        }
    }

    async fn fetch_remote_menu(&self, remote: &dyn RemoteStore) -> Result<Vec<MenuItem>, RemoteError> {
        let docs = remote.list(MENU_COLLECTION).await?;
        if docs.is_empty() {
            info!(count = self.fallback_menu.len(), "remote menu empty, seeding");
            for item in &self.fallback_menu {
                let fields = serde_json::to_value(item)
                    .map_err(|e| RemoteError::Malformed(e.to_string()))?;
                remote.upsert(MENU_COLLECTION, &item.id, fields).await?;
            }
            return Ok(self.fallback_menu.clone());
        }

        let total = docs.len();
        let items: Vec<MenuItem> = docs
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                MenuItem::from_document(doc)
                    .map_err(|e| warn!(%id, error = %e, "skipping malformed menu document"))
                    .ok()
            })
            .collect();
        if items.is_empty() {
            return Err(RemoteError::Malformed(format!(
                "none of {total} menu documents were usable"
            )));
        }
        Ok(items)
    }

    async fn local_menu(&self) -> Vec<MenuItem> {
        match self.local.get(MENU_CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<MenuItem>>(&raw) {
                Ok(items) if !items.is_empty() => items,
                Ok(_) => self.fallback_menu.clone(),
                Err(e) => {
                    warn!(error = %e, "cached menu unreadable, using built-in menu");
                    self.fallback_menu.clone()
                }
            },
            Ok(None) => self.fallback_menu.clone(),
            Err(e) => {
                warn!(error = %e, "local store unavailable, using built-in menu");
                self.fallback_menu.clone()
            }
        }
    }

    async fn cache_menu(&self, items: &[MenuItem]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to encode menu cache");
                return;
            }
        };
        if let Err(e) = self.local.put(MENU_CACHE_KEY, raw).await {
            warn!(error = %e, "failed to refresh local menu cache");
        }
    }

    /// Records an order in the cloud when possible, otherwise appends it to
    /// the local orders log under a `local-` id.
    ///
    /// Remote problems never reach the caller. The only error is failing
    /// to write the local log, in which case nothing was recorded.
    #[instrument(skip(self, items, totals), fields(lines = items.len(), total_cents = totals.total_cents))]
    pub async fn place_order(
        &self,
        items: &[CartItem],
        totals: Totals,
    ) -> Result<PlacedOrder, GatewayError> {
        let draft =
            OrderDraft::new(items, totals).map_err(|e| GatewayError::InvalidOrder(e.to_string()))?;

        if let Some(remote) = self.remote() {
            match create_remote_order(remote, &draft).await {
                Ok(created) => {
                    info!(id = %created.id, "order stored in cloud");
                    return Ok(PlacedOrder {
                        id: created.id,
                        status: ConnectionStatus::Cloud,
                    });
                }
                Err(err) => self.note_remote_failure("place_order", &err),
            }
        }

        let order = self.append_local_order(draft).await?;
        info!(id = %order.id, "order saved locally");
        Ok(PlacedOrder {
            id: order.id,
            status: ConnectionStatus::Local,
        })
    }

    pub async fn local_orders(&self) -> Result<Vec<Order>, GatewayError> {
        match self.local.get(ORDERS_LOG_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(GatewayError::CorruptLog),
            None => Ok(Vec::new()),
        }
    }

    async fn append_local_order(&self, draft: OrderDraft) -> Result<Order, GatewayError> {
        let _log = self.orders_log.lock().await;
        let mut log = self.local_orders().await?;
        let now = Utc::now();
        let id = next_local_id(&log, now.timestamp_millis());
        let order = Order::assign(draft, id, now);
        log.push(order.clone());
        let raw = serde_json::to_string(&log).map_err(GatewayError::Encode)?;
        self.local.put(ORDERS_LOG_KEY, raw).await?;
        Ok(order)
    }
}

async fn create_remote_order(
    remote: &dyn RemoteStore,
    draft: &OrderDraft,
) -> Result<CreatedDocument, RemoteError> {
    let fields = serde_json::to_value(draft).map_err(|e| RemoteError::Malformed(e.to_string()))?;
    remote.create(ORDERS_COLLECTION, fields).await
}

/// `local-<millis>`, bumped past any id already present in the log.
fn next_local_id(log: &[Order], mut millis: i64) -> String {
    loop {
        let id = format!("{LOCAL_ORDER_PREFIX}{millis}");
        if !log.iter().any(|o| o.id == id) {
            return id;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_types::domain::cart::Cart;
    use cafe_types::domain::order::OrderDraft;

    fn logged(id: &str) -> Order {
        let mut cart = Cart::new();
        cart.add(&catalog::fallback_menu()[0]);
        Order::assign(OrderDraft::from_cart(&cart).unwrap(), id.into(), Utc::now())
    }

    #[test]
    fn local_ids_skip_collisions() {
        assert_eq!(next_local_id(&[], 1_000), "local-1000");
        let log = vec![logged("local-1000"), logged("local-1001")];
        assert_eq!(next_local_id(&log, 1_000), "local-1002");
    }
}
