use booth_catalog::Page;
use booth_shared::{Order, OrderStatus, Table};
use serde::{Deserialize, Serialize};

use crate::accounting::{effective_total, ordered_quantity, refundable_quantity, refunded_quantity};

pub const TABLE_ORDERS_PER_PAGE: usize = 10;
pub const TABLES_PER_PAGE: usize = 20;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    PreOrder,
    Completed,
    Refunded,
}

impl StatusFilter {
    fn matches(&self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::PreOrder => status == OrderStatus::PreOrder,
            StatusFilter::Completed => status == OrderStatus::Completed,
            StatusFilter::Refunded => status == OrderStatus::Refunded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Admin order list query (`?search=&status=&sort_by=&order=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: SortOrder,
}

impl OrderQuery {
    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matched: Vec<Order> = orders
            .into_iter()
            .filter(|order| self.status.matches(order.status))
            .filter(|order| match &needle {
                Some(needle) => matches_search(order, needle),
                None => true,
            })
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match self.sort_by {
                SortBy::Date => a.order_date.cmp(&b.order_date),
                SortBy::Amount => effective_total(a).cmp(&effective_total(b)),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        matched
    }
}

fn matches_search(order: &Order, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);
    order.payer_name.as_deref().is_some_and(contains)
        || contains(&order.id)
        || order.table.name.as_deref().is_some_and(contains)
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct OrderSummary {
    pub total_revenue: i64,
    pub total_orders: usize,
    pub completed_orders: usize,
    pub pre_orders: usize,
}

impl OrderSummary {
    pub fn of(orders: &[Order]) -> Self {
        Self {
            total_revenue: orders.iter().map(effective_total).sum(),
            total_orders: orders.len(),
            completed_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .count(),
            pre_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::PreOrder)
                .count(),
        }
    }
}

/// Refund position of one food on one order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LineBalance {
    pub food_id: i64,
    pub name: String,
    pub ordered: u32,
    pub refunded: u32,
    pub refundable: u32,
}

/// An order as the refund screen shows it.
#[derive(Debug, Clone, Serialize)]
pub struct TableOrder {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<LineBalance>,
}

impl TableOrder {
    pub fn new(order: Order) -> Self {
        let mut lines: Vec<LineBalance> = Vec::new();
        for line in &order.items {
            let food_id = line.food.id;
            if lines.iter().any(|b| b.food_id == food_id) {
                continue;
            }
            lines.push(LineBalance {
                food_id,
                name: line.food.name.clone(),
                ordered: ordered_quantity(&order, food_id),
                refunded: refunded_quantity(&order, food_id),
                refundable: refundable_quantity(&order, food_id),
            });
        }
        Self { order, lines }
    }
}

/// Orders still on a table's bill.
#[derive(Debug, Clone, Serialize)]
pub struct TableOrdersView {
    pub table: Table,
    pub total_revenue: i64,
    pub order_count: usize,
    pub orders: Page<TableOrder>,
}

impl TableOrdersView {
    pub fn build(table: Table, orders: Vec<Order>, page: Option<usize>) -> Self {
        let mut visible: Vec<Order> = orders
            .into_iter()
            .filter(|o| o.is_visible && o.table.id == table.id)
            .collect();
        visible.sort_by(|a, b| b.order_date.cmp(&a.order_date));

        let total_revenue = visible.iter().map(effective_total).sum();
        let order_count = visible.len();

        Self {
            table,
            total_revenue,
            order_count,
            orders: Page::paginate(
                visible.into_iter().map(TableOrder::new).collect(),
                page,
                TABLE_ORDERS_PER_PAGE,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableActivity {
    pub table: Table,
    pub display_name: String,
    pub active_order_count: usize,
}

/// Visible order count per table, newest tables first.
pub fn table_activity(tables: Vec<Table>, orders: &[Order], search: Option<&str>) -> Vec<TableActivity> {
    let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

    let mut rows: Vec<TableActivity> = tables
        .into_iter()
        .filter(|table| match &needle {
            Some(needle) => {
                table.id.to_lowercase().contains(needle)
                    || table
                        .name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(needle))
            }
            None => true,
        })
        .map(|table| {
            let active_order_count = orders
                .iter()
                .filter(|o| o.is_visible && o.table.id == table.id)
                .count();
            TableActivity {
                display_name: table.display_name(),
                table,
                active_order_count,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.table.created_at.cmp(&a.table.created_at));
    rows
}
