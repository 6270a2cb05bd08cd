use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::food::Food;
use super::table::Table;

/// Order lifecycle as reported by upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PreOrder,
    #[default]
    Completed,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreOrder => "pre_order",
            Self::Completed => "completed",
            Self::Refunded => "refunded",
        }
    }
}

/// Why a negative line was attached to an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MinusReason {
    SoldOut,
    Unavailable,
    Damaged,
    Refund,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub food: Food,
    pub quantity: u32,
    /// Unit price at the time of ordering.
    pub price: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinusOrderLine {
    pub food: Food,
    /// Stored negative.
    pub quantity: i64,
    pub price: i64,
    pub reason: MinusReason,
}

impl MinusOrderLine {
    /// Negative amount deducted from the order.
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub table: Table,
    #[serde(alias = "order_date", deserialize_with = "deserialize_order_date")]
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default, alias = "minus_items")]
    pub minus_items: Vec<MinusOrderLine>,
    #[serde(alias = "total_amount")]
    pub total_amount: i64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "payer_name")]
    pub payer_name: Option<String>,
    #[serde(default, alias = "pre_order_amount")]
    pub pre_order_amount: Option<i64>,
    #[serde(default = "default_visible", alias = "is_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    #[serde(alias = "total_spent")]
    pub total_spent: i64,
}

impl OrderHistory {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reads an upstream timestamp.
///
/// Naive timestamps are UTC. Anything unparseable becomes "now" so a single
/// bad row never hides a table's history.
pub fn parse_order_date(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_utc();
        }
    }

    tracing::warn!("Failed to parse order date {:?}, using current time", raw);
    Utc::now()
}

fn deserialize_order_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_order_date(&raw))
}
