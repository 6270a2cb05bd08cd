use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
    Json, Router,
};
use booth_catalog::Menu;
use booth_order::{history_total, Cart, CartItem};
use booth_shared::{CreateOrderRequest, Order, OrderHistory, Table, TableEvent};
use futures_util::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(get_menu))
        .route("/api/tables/{table_id}", get(get_table))
        .route("/api/tables/{table_id}/history", get(get_history))
        .route("/api/tables/{table_id}/cart", get(get_cart).delete(clear_cart))
        .route("/api/tables/{table_id}/cart/items", post(add_cart_item))
        .route(
            "/api/tables/{table_id}/cart/items/{food_id}",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/tables/{table_id}/orders", post(submit_order))
        .route("/api/tables/{table_id}/events", get(table_events))
        .route("/api/tables/{table_id}/staff-call", post(call_staff))
}

// ============================================================================
// Request / Response
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CartView {
    pub table_id: String,
    pub items: Vec<CartItem>,
    pub total_price: i64,
    pub total_items: u64,
}

impl CartView {
    pub fn new(table_id: &str, cart: &Cart) -> Self {
        Self {
            table_id: table_id.to_string(),
            items: cart.items().to_vec(),
            total_price: cart.total_price(),
            total_items: cart.total_items(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub food_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub order: Order,
    pub history: OrderHistory,
}

#[derive(Debug, Deserialize)]
pub struct StaffCallRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StaffCallResponse {
    pub table_id: String,
    pub notified: bool,
}

// ============================================================================
// Menu & table
// ============================================================================

/// GET /api/menu
async fn get_menu(State(state): State<AppState>) -> Result<Json<Menu>, AppError> {
    let menu = Menu::from_foods(state.api.list_foods(None).await?);
    if menu.is_empty() {
        tracing::warn!("Upstream returned no foods for the menu");
    } else {
        tracing::debug!("Serving menu with {} foods", menu.len());
    }
    Ok(Json(menu))
}

/// GET /api/tables/{table_id}
async fn get_table(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<Table>, AppError> {
    match state.api.get_table(&table_id).await {
        Ok(table) => Ok(Json(table)),
        Err(e) if e.is_not_found() => Err(AppError::NotFoundError("table not found".to_string())),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/tables/{table_id}/history
async fn get_history(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Json<OrderHistory> {
    Json(load_history(&state, &table_id).await)
}

/// A table's orders; an unreachable upstream shows as an empty history.
/// The total counts settled orders only.
pub(crate) async fn load_history(state: &AppState, table_id: &str) -> OrderHistory {
    match state.api.table_orders(table_id).await {
        Ok(mut history) => {
            history.total_spent = history_total(&history);
            history
        }
        Err(e) => {
            tracing::warn!("Failed to load order history for table {}: {}", table_id, e);
            OrderHistory::empty()
        }
    }
}

// ============================================================================
// Cart
// ============================================================================

/// GET /api/tables/{table_id}/cart
async fn get_cart(State(state): State<AppState>, Path(table_id): Path<String>) -> Json<CartView> {
    let cart = state.carts.get(&table_id).await;
    Json(CartView::new(&table_id, &cart))
}

/// DELETE /api/tables/{table_id}/cart
async fn clear_cart(State(state): State<AppState>, Path(table_id): Path<String>) -> Json<CartView> {
    state.carts.clear(&table_id).await;
    Json(CartView::new(&table_id, &Cart::new()))
}

/// POST /api/tables/{table_id}/cart/items
async fn add_cart_item(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, AppError> {
    // Fresh read so a food sold out since the menu loaded is refused.
    let food = state.api.get_food(req.food_id).await?;
    let (cart, added) = state.carts.update(&table_id, |cart| cart.add(food)).await;
    added?;
    Ok(Json(CartView::new(&table_id, &cart)))
}

/// PUT /api/tables/{table_id}/cart/items/{food_id}
async fn update_cart_item(
    State(state): State<AppState>,
    Path((table_id, food_id)): Path<(String, i64)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let (cart, updated) = state
        .carts
        .update(&table_id, |cart| cart.update_quantity(food_id, req.quantity))
        .await;
    updated?;
    Ok(Json(CartView::new(&table_id, &cart)))
}

/// DELETE /api/tables/{table_id}/cart/items/{food_id}
async fn remove_cart_item(
    State(state): State<AppState>,
    Path((table_id, food_id)): Path<(String, i64)>,
) -> Result<Json<CartView>, AppError> {
    let (cart, removed) = state.carts.update(&table_id, |cart| cart.remove(food_id)).await;
    removed?;
    Ok(Json(CartView::new(&table_id, &cart)))
}

// ============================================================================
// Orders, events, staff
// ============================================================================

/// POST /api/tables/{table_id}/orders
async fn submit_order(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<SubmitOrderResponse>, AppError> {
    let cart = state.carts.get(&table_id).await;
    if cart.is_empty() {
        return Err(AppError::ValidationError("Cart is empty".to_string()));
    }

    let req = CreateOrderRequest {
        table_id: table_id.clone(),
        items: cart.to_order_items(),
    };
    let order = state.api.create_order(&req).await?;
    state
        .carts
        .update(&table_id, |current| current.deduct(cart.items()))
        .await;
    state.metrics.orders_submitted.inc();
    tracing::info!("Order {} submitted for table {} ({} items)", order.id, table_id, cart.total_items());

    let history = load_history(&state, &table_id).await;
    Ok(Json(SubmitOrderResponse { order, history }))
}

/// GET /api/tables/{table_id}/events
async fn table_events(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let table_id = table_id.clone();
        async move {
            match result {
                Ok(event) if event.table_id() == table_id => Event::default()
                    .event(event.name())
                    .json_data(&event)
                    .ok()
                    .map(Ok),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("Event stream for table {} lagged: {}", table_id, e);
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /api/tables/{table_id}/staff-call
async fn call_staff(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    Json(req): Json<StaffCallRequest>,
) -> Result<Json<StaffCallResponse>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::ValidationError("Message is required".to_string()));
    }

    let table_name = match state.api.get_table(&table_id).await {
        Ok(table) => table.display_name(),
        Err(e) => {
            tracing::warn!("Could not resolve table {} for staff call: {}", table_id, e);
            table_id.clone()
        }
    };

    let notified = state.notifier.notify_staff_call(&table_name, Some(message)).await;
    state.events.publish(TableEvent::staff_called(&table_id, message));
    state.metrics.staff_calls.inc();

    Ok(Json(StaffCallResponse { table_id, notified }))
}
