use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::catalog::MOOD_PRESETS;
use crate::application::storefront::Storefront;
use crate::errors::AppError;
use cafe_types::domain::cart::CartView;
use cafe_types::domain::chat::ChatTurn;
use cafe_types::domain::menu::{Category, MenuItem};
use cafe_types::domain::order::{CheckoutReceipt, ConnectionStatus, Order};
use cafe_types::domain::recommendation::Recommendation;
use cafe_types::ports::key_value_store::KeyValueStore;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

#[derive(Clone)]
pub struct HttpServer<L>
where
    L: KeyValueStore,
{
    pub storefront: Arc<Storefront<L>>,
    pub config: HttpServerConfig,
}

#[derive(Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub item_id: String,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub delta: i32,
}

#[derive(Deserialize)]
pub struct RecommendRequest {
    pub mood: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: ConnectionStatus,
}

impl<L> HttpServer<L>
where
    L: KeyValueStore,
{
    pub async fn new(storefront: Storefront<L>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            storefront: Arc::new(storefront),
            config,
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/status", get(status::<L>))
            .route("/menu", get(menu::<L>))
            .route("/menu/featured", get(featured::<L>))
            .route("/moods", get(moods))
            .route("/cart", get(cart::<L>))
            .route("/cart/items", post(add_item::<L>))
            .route(
                "/cart/items/{id}",
                patch(update_quantity::<L>).delete(remove_item::<L>),
            )
            .route("/checkout", post(checkout::<L>))
            .route("/orders", get(list_orders::<L>))
            .route("/recommendations", post(recommend::<L>))
            .route("/chat", get(chat_history::<L>).post(send_chat::<L>))
            .with_state(self.storefront.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::debug!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        // The browser view shell is served from its own origin.
        let app = self
            .router()
            .layer(trace_layer)
            .layer(CorsLayer::permissive());

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting storefront on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

type Shared<L> = State<Arc<Storefront<L>>>;

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn status<L: KeyValueStore>(State(store): Shared<L>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: store.status().await,
    })
}

async fn menu<L: KeyValueStore>(
    State(store): Shared<L>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<MenuItem>>, AppError> {
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(c) if c.eq_ignore_ascii_case("all") => None,
        Some(c) => Some(
            c.parse::<Category>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
    };
    Ok(Json(store.menu(category).await))
}

async fn featured<L: KeyValueStore>(State(store): Shared<L>) -> Json<Vec<MenuItem>> {
    Json(store.featured().await)
}

async fn moods() -> Json<Vec<&'static str>> {
    Json(MOOD_PRESETS.to_vec())
}

async fn cart<L: KeyValueStore>(State(store): Shared<L>) -> Json<CartView> {
    Json(store.cart().await)
}

async fn add_item<L: KeyValueStore>(
    State(store): Shared<L>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(store.add_to_cart(&payload.item_id).await?))
}

async fn update_quantity<L: KeyValueStore>(
    State(store): Shared<L>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Json<CartView> {
    Json(store.update_quantity(&id, payload.delta).await)
}

async fn remove_item<L: KeyValueStore>(
    State(store): Shared<L>,
    Path(id): Path<String>,
) -> Json<CartView> {
    Json(store.remove_from_cart(&id).await)
}

async fn checkout<L: KeyValueStore>(
    State(store): Shared<L>,
) -> Result<(axum::http::StatusCode, Json<CheckoutReceipt>), AppError> {
    let receipt = store.checkout().await?;
    Ok((axum::http::StatusCode::CREATED, Json(receipt)))
}

async fn list_orders<L: KeyValueStore>(
    State(store): Shared<L>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(store.local_orders().await?))
}

async fn recommend<L: KeyValueStore>(
    State(store): Shared<L>,
    Json(payload): Json<RecommendRequest>,
) -> Json<Option<Recommendation>> {
    Json(store.recommend(&payload.mood).await)
}

async fn chat_history<L: KeyValueStore>(State(store): Shared<L>) -> Json<Vec<ChatTurn>> {
    Json(store.chat_history().await)
}

async fn send_chat<L: KeyValueStore>(
    State(store): Shared<L>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatTurn>, AppError> {
    Ok(Json(store.chat(&payload.message).await?))
}
