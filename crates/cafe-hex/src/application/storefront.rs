use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cafe_types::domain::cart::{Cart, CartView};
use cafe_types::domain::chat::ChatTurn;
use cafe_types::domain::menu::{Category, MenuItem};
use cafe_types::domain::order::{CheckoutReceipt, ConnectionStatus, Order};
use cafe_types::domain::recommendation::Recommendation;
use cafe_types::ports::completion::CompletionService;
use cafe_types::ports::key_value_store::KeyValueStore;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, Instrument};

use crate::application::catalog;
use crate::application::chat::{ChatAdapter, ChatSession};
use crate::application::gateway::PersistenceGateway;
use crate::application::recommendation::RecommendationAdapter;
use crate::errors::AppError;

/// Session state behind the storefront views: the loaded catalog, one
/// cart, one barista conversation and the last observed connection status.
pub struct Storefront<L: KeyValueStore> {
    gateway: Arc<PersistenceGateway<L>>,
    recommender: RecommendationAdapter,
    barista: ChatAdapter,
    catalog: RwLock<Vec<MenuItem>>,
    status: Arc<RwLock<ConnectionStatus>>,
    cart: Arc<Mutex<Cart>>,
    chat: Mutex<ChatSession>,
    checkout_in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag however the placement exits.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<L: KeyValueStore> Storefront<L> {
    /// Builds the session with an empty catalog; call [`Self::load_catalog`]
    /// before serving.
    pub fn new(gateway: PersistenceGateway<L>, completion: Arc<dyn CompletionService>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            recommender: RecommendationAdapter::new(completion.clone()),
            barista: ChatAdapter::new(completion),
            catalog: RwLock::new(Vec::new()),
            status: Arc::new(RwLock::new(ConnectionStatus::Local)),
            cart: Arc::new(Mutex::new(Cart::new())),
            chat: Mutex::new(ChatSession::new()),
            checkout_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn open(
        gateway: PersistenceGateway<L>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        let storefront = Self::new(gateway, completion);
        storefront.load_catalog().await;
        storefront
    }

    pub async fn load_catalog(&self) -> ConnectionStatus {
        let load = self.gateway.fetch_menu().await;
        info!(items = load.items.len(), status = ?load.status, "catalog loaded");
        *self.catalog.write().await = load.items;
        *self.status.write().await = load.status;
        load.status
    }

    pub async fn status(&self) -> ConnectionStatus {
        *self.status.read().await
    }

    pub async fn menu(&self, category: Option<Category>) -> Vec<MenuItem> {
        catalog::filter_by_category(&self.catalog.read().await, category)
    }

    pub async fn featured(&self) -> Vec<MenuItem> {
        catalog::featured(&self.catalog.read().await)
    }

    pub async fn cart(&self) -> CartView {
        CartView::from(&*self.cart.lock().await)
    }

    pub async fn add_to_cart(&self, item_id: &str) -> Result<CartView, AppError> {
        let item = self
            .catalog
            .read()
            .await
            .iter()
            .find(|m| m.id == item_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("menu item {item_id}")))?;
        let mut cart = self.cart.lock().await;
        cart.add(&item);
        Ok(CartView::from(&*cart))
    }

    pub async fn remove_from_cart(&self, item_id: &str) -> CartView {
        let mut cart = self.cart.lock().await;
        cart.remove(item_id);
        CartView::from(&*cart)
    }

    pub async fn update_quantity(&self, item_id: &str, delta: i32) -> CartView {
        let mut cart = self.cart.lock().await;
        cart.update_quantity(item_id, delta);
        CartView::from(&*cart)
    }

    /// Places the current cart as an order and empties the cart on success.
    ///
    /// The placement runs on its own task, so a caller that goes away
    /// mid-checkout does not cancel it: the order still lands and the cart
    /// is still cleared. A second checkout while one is in flight is
    /// rejected rather than queued. When the order cannot be recorded at
    /// all the cart is kept so the shopper can retry.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<CheckoutReceipt, AppError> {
        if self
            .checkout_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::Conflict("checkout already in progress".into()));
        }
        let in_flight = InFlight(self.checkout_in_flight.clone());

        let (items, totals) = {
            let cart = self.cart.lock().await;
            if cart.is_empty() {
                return Err(AppError::BadRequest("cart is empty".into()));
            }
            (cart.items().to_vec(), cart.totals())
        };

        let gateway = self.gateway.clone();
        let cart = self.cart.clone();
        let status = self.status.clone();
        let placement = tokio::spawn(async move {
            let _in_flight = in_flight;
            match gateway.place_order(&items, totals).await {
                Ok(placed) => {
                    cart.lock().await.clear();
                    *status.write().await = placed.status;
                    Ok(CheckoutReceipt::from(placed))
                }
                Err(e) => {
                    error!(error = %e, "checkout failed, cart preserved");
                    *status.write().await = ConnectionStatus::Error;
                    Err(AppError::CheckoutFailed(e.to_string()))
                }
            }
        }
        .in_current_span());

        placement
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("checkout task failed: {e}")))?
    }

    pub async fn local_orders(&self) -> Result<Vec<Order>, AppError> {
        self.gateway
            .local_orders()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub async fn recommend(&self, mood: &str) -> Option<Recommendation> {
        let catalog = self.catalog.read().await.clone();
        self.recommender.recommend(mood, &catalog).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatTurn, AppError> {
        let catalog = self.catalog.read().await.clone();
        let mut session = self.chat.lock().await;
        self.barista
            .send(&mut session, message, &catalog)
            .await
            .ok_or_else(|| AppError::BadRequest("message is empty".into()))
    }

    pub async fn chat_history(&self) -> Vec<ChatTurn> {
        self.chat.lock().await.history().to_vec()
    }
}
