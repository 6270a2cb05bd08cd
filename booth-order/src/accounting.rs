use std::collections::HashMap;

use booth_shared::{Food, MinusReason, Order, OrderHistory, OrderStatus, Table};
use chrono::NaiveDate;
use serde::Serialize;

const RECENT_ORDER_LIMIT: usize = 5;
const POPULAR_FOOD_LIMIT: usize = 5;

/// Amount actually owed for an order.
///
/// Pre-orders carry the quoted amount separately; everything else uses
/// upstream's `total_amount`, which already has minus lines applied.
pub fn effective_total(order: &Order) -> i64 {
    match (order.status, order.pre_order_amount) {
        (OrderStatus::PreOrder, Some(amount)) => amount,
        _ => order.total_amount,
    }
}

pub fn ordered_quantity(order: &Order, food_id: i64) -> u32 {
    order
        .items
        .iter()
        .filter(|line| line.food.id == food_id)
        .map(|line| line.quantity)
        .sum()
}

/// Units of `food_id` already refunded on this order.
pub fn refunded_quantity(order: &Order, food_id: i64) -> u32 {
    let total: i64 = order
        .minus_items
        .iter()
        .filter(|line| line.reason == MinusReason::Refund && line.food.id == food_id)
        .map(|line| line.quantity)
        .sum();
    u32::try_from(total.unsigned_abs()).unwrap_or(u32::MAX)
}

pub fn refundable_quantity(order: &Order, food_id: i64) -> u32 {
    ordered_quantity(order, food_id).saturating_sub(refunded_quantity(order, food_id))
}

/// Σ of settled orders; pre-orders are still waiting on payment.
pub fn history_total(history: &OrderHistory) -> i64 {
    history
        .orders
        .iter()
        .filter(|order| order.status != OrderStatus::PreOrder)
        .map(effective_total)
        .sum()
}

fn is_settled(order: &Order) -> bool {
    order.status == OrderStatus::Completed
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PopularFood {
    pub food_id: i64,
    pub name: String,
    pub order_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub today_orders: usize,
    pub total_revenue: i64,
    pub today_revenue: i64,
    pub total_foods: usize,
    pub total_tables: usize,
    pub sold_out_foods: usize,
    pub recent_orders: Vec<Order>,
    pub popular_foods: Vec<PopularFood>,
}

impl DashboardStats {
    pub fn compute(orders: &[Order], foods: &[Food], tables: &[Table], today: NaiveDate) -> Self {
        let settled: Vec<&Order> = orders.iter().filter(|o| is_settled(o)).collect();
        let todays: Vec<&Order> = settled
            .iter()
            .copied()
            .filter(|o| o.order_date.date_naive() == today)
            .collect();

        let mut recent: Vec<&Order> = settled
            .iter()
            .copied()
            .filter(|o| effective_total(o) > 0)
            .collect();
        recent.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        let recent_orders = recent
            .into_iter()
            .take(RECENT_ORDER_LIMIT)
            .cloned()
            .collect();

        Self {
            total_orders: settled.len(),
            today_orders: todays.len(),
            total_revenue: settled.iter().map(|o| effective_total(o)).sum(),
            today_revenue: todays.iter().map(|o| effective_total(o)).sum(),
            total_foods: foods.len(),
            total_tables: tables.len(),
            sold_out_foods: foods.iter().filter(|f| f.sold_out).count(),
            recent_orders,
            popular_foods: popular_foods(orders, foods),
        }
    }
}

/// Foods ranked by how many non-pre-order orders contain them.
fn popular_foods(orders: &[Order], foods: &[Food]) -> Vec<PopularFood> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for order in orders.iter().filter(|o| o.status != OrderStatus::PreOrder) {
        let mut seen: Vec<i64> = Vec::new();
        for line in &order.items {
            if !seen.contains(&line.food.id) {
                seen.push(line.food.id);
                *counts.entry(line.food.id).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<PopularFood> = foods
        .iter()
        .map(|food| PopularFood {
            food_id: food.id,
            name: food.name.clone(),
            order_count: counts.get(&food.id).copied().unwrap_or(0),
        })
        .collect();
    ranked.sort_by(|a, b| b.order_count.cmp(&a.order_count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(POPULAR_FOOD_LIMIT);
    ranked
}
