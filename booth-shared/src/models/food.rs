use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Menu sections. The legacy catalog vocabulary (`menu`/`drinks`) is still accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    #[serde(alias = "menu")]
    Main,
    #[serde(alias = "drinks")]
    Side,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 2] = [FoodCategory::Main, FoodCategory::Side];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Side => "side",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "main" | "menu" => Some(Self::Main),
            "side" | "drinks" => Some(Self::Side),
            _ => None,
        }
    }
}

/// A catalog entry as served by upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub category: FoodCategory,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "sold_out")]
    pub sold_out: bool,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
