use serde::{Deserialize, Serialize};

use super::food::FoodCategory;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemRequest {
    pub food_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreOrderRequest {
    pub payer_name: String,
    pub total_amount: i64,
    pub items: Vec<OrderItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub order_id: String,
    pub payment_completed: bool,
    pub order_status: String,
    #[serde(default)]
    pub payer_name: Option<String>,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: FoodCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Partial update; absent fields are left untouched upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFoodRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FoodCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_out: Option<bool>,
}
