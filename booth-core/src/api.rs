use async_trait::async_trait;
use booth_shared::{
    CreateFoodRequest, CreateOrderRequest, Food, FoodCategory, Order, OrderHistory,
    PaymentStatusResponse, PreOrderRequest, PreOrderResponse, Table, UpdateFoodRequest,
};

/// Failure talking to the ordering API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not decode upstream response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Upstream refused the input itself (400 or 422).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Status { status: 400 | 422, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything the kiosk and the admin panel need from the remote ordering API.
///
/// The service owns no durable state; every read and write goes through this seam.
#[async_trait]
pub trait BoothApi: Send + Sync {
    async fn list_foods(&self, category: Option<FoodCategory>) -> ApiResult<Vec<Food>>;

    async fn get_food(&self, food_id: i64) -> ApiResult<Food>;

    async fn create_food(&self, req: &CreateFoodRequest) -> ApiResult<Food>;

    async fn update_food(&self, food_id: i64, req: &UpdateFoodRequest) -> ApiResult<Food>;

    async fn delete_food(&self, food_id: i64) -> ApiResult<()>;

    async fn list_tables(&self) -> ApiResult<Vec<Table>>;

    async fn get_table(&self, table_id: &str) -> ApiResult<Table>;

    async fn create_table(&self) -> ApiResult<Table>;

    /// Direct order without payment.
    async fn create_order(&self, req: &CreateOrderRequest) -> ApiResult<Order>;

    /// Provisional order used to obtain a payment redirect URL.
    async fn create_pre_order(
        &self,
        table_id: &str,
        req: &PreOrderRequest,
    ) -> ApiResult<PreOrderResponse>;

    /// All orders, or one table's when `table_id` is set.
    async fn order_history(&self, table_id: Option<&str>) -> ApiResult<OrderHistory>;

    async fn table_orders(&self, table_id: &str) -> ApiResult<OrderHistory>;

    async fn payment_status(&self, order_id: &str) -> ApiResult<PaymentStatusResponse>;

    /// Hides every order of the table (checkout).
    async fn reset_table_orders(&self, table_id: &str) -> ApiResult<()>;
}
