use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use booth_catalog::{FoodDraft, FoodFilter, FoodPatch, Page};
use booth_order::{
    table_activity, DashboardStats, OrderQuery, OrderSummary, TableActivity, TableOrdersView,
};
use booth_shared::{Food, Order, Table, UpdateFoodRequest};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

const FOODS_PER_PAGE: usize = 20;
const TABLES_PER_PAGE: usize = 20;

/// Routes behind the admin JWT; the auth layer is added in `app`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/foods", get(list_foods).post(create_food))
        .route(
            "/admin/foods/{id}",
            get(get_food).patch(update_food).delete(delete_food),
        )
        .route("/admin/foods/{id}/toggle-sold-out", post(toggle_sold_out))
        .route("/admin/tables", get(list_tables).post(create_table))
        .route("/admin/tables/{id}/orders", get(table_orders))
        .route("/admin/tables/{id}/checkout", post(checkout_table))
        .route("/admin/orders", get(list_orders))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FoodListQuery {
    #[serde(flatten)]
    pub filter: FoodFilter,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TableListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub summary: OrderSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckoutTableResponse {
    pub table_id: String,
    pub checked_out: bool,
}

/// Unparseable page numbers fall back to the first page.
fn page_number(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|p| p.trim().parse().ok())
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /admin/dashboard
async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    let history = state.api.order_history(None).await?;
    let foods = state.api.list_foods(None).await?;
    let tables = state.api.list_tables().await?;

    Ok(Json(DashboardStats::compute(
        &history.orders,
        &foods,
        &tables,
        Utc::now().date_naive(),
    )))
}

// ============================================================================
// Foods
// ============================================================================

/// GET /admin/foods?search=&category=&page=
async fn list_foods(
    State(state): State<AppState>,
    Query(query): Query<FoodListQuery>,
) -> Result<Json<Page<Food>>, AppError> {
    let foods = state.api.list_foods(None).await?;
    let matched = query.filter.apply(foods);
    Ok(Json(Page::paginate(
        matched,
        page_number(query.page.as_deref()),
        FOODS_PER_PAGE,
    )))
}

/// POST /admin/foods
async fn create_food(
    State(state): State<AppState>,
    Json(draft): Json<FoodDraft>,
) -> Result<(StatusCode, Json<Food>), AppError> {
    let req = draft.validate()?;
    let food = state.api.create_food(&req).await?;
    tracing::info!("Created food {} ({})", food.id, food.name);
    Ok((StatusCode::CREATED, Json(food)))
}

/// GET /admin/foods/{id}
async fn get_food(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
) -> Result<Json<Food>, AppError> {
    Ok(Json(state.api.get_food(food_id).await?))
}

/// PATCH /admin/foods/{id}
async fn update_food(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
    Json(patch): Json<FoodPatch>,
) -> Result<Json<Food>, AppError> {
    let req = patch.validate()?;
    Ok(Json(state.api.update_food(food_id, &req).await?))
}

/// DELETE /admin/foods/{id}
async fn delete_food(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.api.delete_food(food_id).await?;
    tracing::info!("Deleted food {}", food_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/foods/{id}/toggle-sold-out
async fn toggle_sold_out(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
) -> Result<Json<Food>, AppError> {
    let food = state.api.get_food(food_id).await?;
    let req = UpdateFoodRequest {
        sold_out: Some(!food.sold_out),
        ..Default::default()
    };
    let updated = state.api.update_food(food_id, &req).await?;
    tracing::info!(
        "{} is now {}",
        updated.name,
        if updated.sold_out { "sold out" } else { "on sale" }
    );
    Ok(Json(updated))
}

// ============================================================================
// Tables
// ============================================================================

/// GET /admin/tables?search=&page=
async fn list_tables(
    State(state): State<AppState>,
    Query(query): Query<TableListQuery>,
) -> Result<Json<Page<TableActivity>>, AppError> {
    let tables = state.api.list_tables().await?;
    let history = state.api.order_history(None).await?;
    let rows = table_activity(tables, &history.orders, query.search.as_deref());
    Ok(Json(Page::paginate(
        rows,
        page_number(query.page.as_deref()),
        TABLES_PER_PAGE,
    )))
}

/// POST /admin/tables
async fn create_table(State(state): State<AppState>) -> Result<(StatusCode, Json<Table>), AppError> {
    let table = state.api.create_table().await?;
    tracing::info!("Created table {}", table.id);
    Ok((StatusCode::CREATED, Json(table)))
}

/// GET /admin/tables/{id}/orders?page=
async fn table_orders(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TableOrdersView>, AppError> {
    let table = state.api.get_table(&table_id).await?;
    let history = state.api.table_orders(&table_id).await?;
    Ok(Json(TableOrdersView::build(
        table,
        history.orders,
        page_number(query.page.as_deref()),
    )))
}

/// POST /admin/tables/{id}/checkout
async fn checkout_table(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
) -> Result<Json<CheckoutTableResponse>, AppError> {
    state.api.reset_table_orders(&table_id).await?;
    state.carts.clear(&table_id).await;
    tracing::info!("Table {} checked out", table_id);
    Ok(Json(CheckoutTableResponse {
        table_id,
        checked_out: true,
    }))
}

// ============================================================================
// Orders
// ============================================================================

/// GET /admin/orders?search=&status=&sort_by=&order=
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let history = state.api.order_history(None).await?;
    let orders = query.apply(history.orders);
    let summary = OrderSummary::of(&orders);
    Ok(Json(OrderListResponse { orders, summary }))
}
