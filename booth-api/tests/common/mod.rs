#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use booth_api::{app, AppState};
use booth_core::{ApiError, ApiResult, BoothApi};
use booth_shared::{
    CreateFoodRequest, CreateOrderRequest, Food, FoodCategory, Order, OrderHistory, OrderLine,
    OrderStatus, PaymentStatusResponse, PreOrderRequest, PreOrderResponse, Table,
    UpdateFoodRequest,
};
use booth_store::app_config::{
    AdminConfig, AuthConfig, Config, NotifyConfig, PaymentConfig, ResiliencyConfig, ServerConfig,
    UpstreamConfig,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret-pw";

pub const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
pub const DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";

pub fn food(id: i64, name: &str, price: i64, category: FoodCategory) -> Food {
    Food {
        id,
        name: name.to_string(),
        description: None,
        price,
        category,
        image: None,
        sold_out: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn table(id: &str, name: &str) -> Table {
    Table {
        id: id.to_string(),
        name: Some(name.to_string()),
        created_at: None,
        updated_at: None,
    }
}

/// In-memory upstream.
pub struct FakeApi {
    pub foods: Mutex<Vec<Food>>,
    pub tables: Mutex<Vec<Table>>,
    pub orders: Mutex<Vec<Order>>,
    pub pre_orders: Mutex<Vec<(String, PreOrderRequest)>>,
    pub resets: Mutex<Vec<String>>,
    pub redirect_url: Mutex<String>,
    pub paid: AtomicBool,
    pub status_fails: AtomicBool,
    pub history_fails: AtomicBool,
    pub pre_order_rejects: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        let mut sold_out = food(3, "Corn Dog", 4000, FoodCategory::Main);
        sold_out.sold_out = true;

        Self {
            foods: Mutex::new(vec![
                food(1, "Tteokbokki", 8000, FoodCategory::Main),
                food(2, "Lemonade", 3000, FoodCategory::Side),
                sold_out,
            ]),
            tables: Mutex::new(vec![table("t1", "A-1"), table("t2", "A-2")]),
            orders: Mutex::new(Vec::new()),
            pre_orders: Mutex::new(Vec::new()),
            resets: Mutex::new(Vec::new()),
            redirect_url: Mutex::new("https://pay.example.com/checkout/1".to_string()),
            paid: AtomicBool::new(false),
            status_fails: AtomicBool::new(false),
            history_fails: AtomicBool::new(false),
            pre_order_rejects: AtomicBool::new(false),
        }
    }

    pub fn set_paid(&self, paid: bool) {
        self.paid.store(paid, Ordering::SeqCst);
    }

    pub fn set_status_fails(&self, fails: bool) {
        self.status_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_redirect(&self, url: &str) {
        *self.redirect_url.lock().unwrap() = url.to_string();
    }

    pub fn push_order(&self, order: Order) {
        self.orders.lock().unwrap().push(order);
    }

    fn find_food(&self, id: i64) -> ApiResult<Food> {
        self.foods
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/foods/{}/", id)))
    }

    fn find_table(&self, id: &str) -> ApiResult<Table> {
        self.tables
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/tables/{}/", id)))
    }

    fn history_of(&self, table_id: Option<&str>) -> OrderHistory {
        let orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| table_id.map_or(true, |id| o.table.id == id))
            .cloned()
            .collect();
        let total_spent = orders.iter().map(|o| o.total_amount).sum();
        OrderHistory { orders, total_spent }
    }
}

pub fn order(id: &str, table: Table, total: i64, status: OrderStatus, lines: Vec<OrderLine>) -> Order {
    Order {
        id: id.to_string(),
        table,
        order_date: Utc::now(),
        items: lines,
        minus_items: Vec::new(),
        total_amount: total,
        status,
        payer_name: None,
        pre_order_amount: None,
        is_visible: true,
    }
}

#[async_trait]
impl BoothApi for FakeApi {
    async fn list_foods(&self, category: Option<FoodCategory>) -> ApiResult<Vec<Food>> {
        Ok(self
            .foods
            .lock()
            .unwrap()
            .iter()
            .filter(|f| category.map_or(true, |c| f.category == c))
            .cloned()
            .collect())
    }

    async fn get_food(&self, food_id: i64) -> ApiResult<Food> {
        self.find_food(food_id)
    }

    async fn create_food(&self, req: &CreateFoodRequest) -> ApiResult<Food> {
        let mut foods = self.foods.lock().unwrap();
        let id = foods.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let mut created = food(id, &req.name, req.price, req.category);
        created.image = req.image.clone();
        foods.push(created.clone());
        Ok(created)
    }

    async fn update_food(&self, food_id: i64, req: &UpdateFoodRequest) -> ApiResult<Food> {
        let mut foods = self.foods.lock().unwrap();
        let food = foods
            .iter_mut()
            .find(|f| f.id == food_id)
            .ok_or_else(|| ApiError::NotFound(format!("/foods/{}/", food_id)))?;
        if let Some(name) = &req.name {
            food.name = name.clone();
        }
        if let Some(price) = req.price {
            food.price = price;
        }
        if let Some(sold_out) = req.sold_out {
            food.sold_out = sold_out;
        }
        Ok(food.clone())
    }

    async fn delete_food(&self, food_id: i64) -> ApiResult<()> {
        let mut foods = self.foods.lock().unwrap();
        let before = foods.len();
        foods.retain(|f| f.id != food_id);
        if foods.len() == before {
            return Err(ApiError::NotFound(format!("/foods/{}/", food_id)));
        }
        Ok(())
    }

    async fn list_tables(&self) -> ApiResult<Vec<Table>> {
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn get_table(&self, table_id: &str) -> ApiResult<Table> {
        self.find_table(table_id)
    }

    async fn create_table(&self) -> ApiResult<Table> {
        let mut tables = self.tables.lock().unwrap();
        let created = Table {
            id: format!("t{}", tables.len() + 1),
            name: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tables.push(created.clone());
        Ok(created)
    }

    async fn create_order(&self, req: &CreateOrderRequest) -> ApiResult<Order> {
        let table = self.find_table(&req.table_id)?;
        let mut lines = Vec::new();
        for item in &req.items {
            let food = self.find_food(item.food_id)?;
            lines.push(OrderLine {
                price: food.price,
                food,
                quantity: item.quantity,
            });
        }
        let total = lines.iter().map(|l| l.line_total()).sum();
        let id = format!("order-{}", self.orders.lock().unwrap().len() + 1);
        let created = order(&id, table, total, OrderStatus::Completed, lines);
        self.push_order(created.clone());
        Ok(created)
    }

    async fn create_pre_order(
        &self,
        table_id: &str,
        req: &PreOrderRequest,
    ) -> ApiResult<PreOrderResponse> {
        if self.pre_order_rejects.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 400,
                body: r#"{"total_amount":["Ensure this value is greater than or equal to 1."]}"#.to_string(),
            });
        }
        let mut pre_orders = self.pre_orders.lock().unwrap();
        pre_orders.push((table_id.to_string(), req.clone()));
        Ok(PreOrderResponse {
            order_id: format!("pre-{}", pre_orders.len()),
            redirect_url: self.redirect_url.lock().unwrap().clone(),
            message: "created".to_string(),
        })
    }

    async fn order_history(&self, table_id: Option<&str>) -> ApiResult<OrderHistory> {
        Ok(self.history_of(table_id))
    }

    async fn table_orders(&self, table_id: &str) -> ApiResult<OrderHistory> {
        if self.history_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(self.history_of(Some(table_id)))
    }

    async fn payment_status(&self, order_id: &str) -> ApiResult<PaymentStatusResponse> {
        if self.status_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "payment service down".to_string(),
            });
        }
        let paid = self.paid.load(Ordering::SeqCst);
        Ok(PaymentStatusResponse {
            order_id: order_id.to_string(),
            payment_completed: paid,
            order_status: if paid { "completed" } else { "pre_order" }.to_string(),
            payer_name: None,
            total_amount: 0,
        })
    }

    async fn reset_table_orders(&self, table_id: &str) -> ApiResult<()> {
        self.find_table(table_id)?;
        self.resets.lock().unwrap().push(table_id.to_string());
        for order in self.orders.lock().unwrap().iter_mut() {
            if order.table.id == table_id {
                order.is_visible = false;
            }
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig { port: 0 },
        upstream: UpstreamConfig {
            base_url: "http://upstream.invalid/api".to_string(),
            timeout_seconds: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_seconds: 3600,
        },
        admin: AdminConfig {
            username: ADMIN_USER.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
        payment: PaymentConfig {
            confirm_delay_ms: 0,
            result_delay_ms: 0,
            session_ttl_seconds: 1800,
        },
        notify: NotifyConfig::default(),
        resiliency: ResiliencyConfig {
            failure_threshold: 5,
            reset_timeout_seconds: 30,
        },
    }
}

pub struct TestApp {
    pub api: Arc<FakeApi>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let api = Arc::new(FakeApi::new());
        let state = AppState::new(api.clone(), &config).unwrap();
        let router = app(state.clone());
        Self { api, state, router }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body, None)).await
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post_json(
                "/admin/login",
                serde_json::json!({ "username": ADMIN_USER, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.admin_token().await;
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token));
        let req = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn add_to_cart(&self, table_id: &str, food_id: i64) -> (StatusCode, Value) {
        self.post_json(
            &format!("/api/tables/{}/cart/items", table_id),
            serde_json::json!({ "food_id": food_id }),
        )
        .await
    }
}

pub fn json_request(method: &str, uri: &str, body: Value, user_agent: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(ua) = user_agent {
        builder = builder.header("User-Agent", ua);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
