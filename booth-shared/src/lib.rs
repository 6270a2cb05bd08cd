pub mod models;
pub mod money;
pub mod pii;

pub use models::events::TableEvent;
pub use models::food::{Food, FoodCategory};
pub use models::order::{MinusOrderLine, MinusReason, Order, OrderHistory, OrderLine, OrderStatus};
pub use models::requests::{
    CreateFoodRequest, CreateOrderRequest, OrderItemRequest, PaymentStatusResponse, PreOrderRequest,
    PreOrderResponse, UpdateFoodRequest,
};
pub use models::table::Table;
