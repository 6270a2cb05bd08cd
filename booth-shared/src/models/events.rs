use serde::{Deserialize, Serialize};

/// Signals pushed to every client watching a table.
///
/// The `type` tag matches the message the kiosk listens for, so
/// `OrderComplete` serializes as `{"type":"ORDER_COMPLETE",...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEvent {
    OrderComplete {
        table_id: String,
        order_id: String,
        timestamp: i64,
    },
    StaffCalled {
        table_id: String,
        message: String,
        timestamp: i64,
    },
}

impl TableEvent {
    pub fn order_complete(table_id: &str, order_id: &str) -> Self {
        Self::OrderComplete {
            table_id: table_id.to_string(),
            order_id: order_id.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn staff_called(table_id: &str, message: &str) -> Self {
        Self::StaffCalled {
            table_id: table_id.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn table_id(&self) -> &str {
        match self {
            Self::OrderComplete { table_id, .. } | Self::StaffCalled { table_id, .. } => table_id,
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderComplete { .. } => "order_complete",
            Self::StaffCalled { .. } => "staff_called",
        }
    }
}
