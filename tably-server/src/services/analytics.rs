//! Analytics Service - restaurant and franchise rollups
//!
//! Aggregations run over order snapshots in Rust (monetary fields are
//! exact decimals, not database floats). Windows are `[from, to)` in
//! Unix millis; revenue counts completed orders only, while the status
//! breakdown covers everything placed in the window.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderStatus, Restaurant};
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};

/// Top-selling dish entry
#[derive(Debug, Clone, Serialize)]
pub struct TopDish {
    pub dish_id: String,
    pub name: String,
    pub quantity: u64,
}

/// Rollup for one restaurant
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantSummary {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub order_count: u64,
    pub gross_revenue: Decimal,
    pub discount_total: Decimal,
    pub average_ticket: Decimal,
    pub orders_by_status: HashMap<String, u64>,
    pub top_dishes: Vec<TopDish>,
}

/// Rollup across a franchise
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseSummary {
    pub franchise_code: String,
    pub order_count: u64,
    pub gross_revenue: Decimal,
    pub discount_total: Decimal,
    pub average_ticket: Decimal,
    /// Per-restaurant breakdown, sorted by revenue descending
    pub restaurants: Vec<RestaurantSummary>,
}

const TOP_DISHES: usize = 5;

fn status_key(status: OrderStatus) -> String {
    // snake_case wire representation, same as the serde rename
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| format!("{:?}", status).to_lowercase())
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fold a set of orders into a summary
fn summarize(restaurant: &Restaurant, orders: &[Order]) -> RestaurantSummary {
    let mut orders_by_status: HashMap<String, u64> = HashMap::new();
    for order in orders {
        *orders_by_status.entry(status_key(order.status)).or_insert(0) += 1;
    }

    let completed: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .collect();

    let order_count = completed.len() as u64;
    let gross_revenue: Decimal = completed.iter().map(|o| o.total).sum();
    let discount_total: Decimal = completed
        .iter()
        .map(|o| o.discount_total + o.coupon_discount)
        .sum();
    let average_ticket = if order_count > 0 {
        round2(gross_revenue / Decimal::from(order_count))
    } else {
        Decimal::ZERO
    };

    // Top dishes by quantity across completed orders
    let mut dish_quantities: HashMap<String, (String, u64)> = HashMap::new();
    for order in &completed {
        for line in &order.lines {
            let entry = dish_quantities
                .entry(line.dish.to_string())
                .or_insert_with(|| (line.dish_name.clone(), 0));
            entry.1 += line.quantity as u64;
        }
    }
    let mut top_dishes: Vec<TopDish> = dish_quantities
        .into_iter()
        .map(|(dish_id, (name, quantity))| TopDish {
            dish_id,
            name,
            quantity,
        })
        .collect();
    top_dishes.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.name.cmp(&b.name)));
    top_dishes.truncate(TOP_DISHES);

    RestaurantSummary {
        restaurant_id: restaurant
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        restaurant_name: restaurant.name.clone(),
        order_count,
        gross_revenue,
        discount_total,
        average_ticket,
        orders_by_status,
        top_dishes,
    }
}

pub struct AnalyticsService {
    db: Surreal<Db>,
}

impl AnalyticsService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Summary for one restaurant over `[from, to)`
    pub async fn restaurant_summary(
        &self,
        restaurant: &Restaurant,
        from: i64,
        to: i64,
    ) -> AppResult<RestaurantSummary> {
        let restaurant_id = restaurant
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;

        let repo = OrderRepository::new(self.db.clone());
        let orders = repo
            .find_in_range(&restaurant_id, from, to)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok(summarize(restaurant, &orders))
    }

    /// Summary across every restaurant of a franchise over `[from, to)`
    pub async fn franchise_summary(
        &self,
        franchise_code: &str,
        restaurants: &[Restaurant],
        from: i64,
        to: i64,
    ) -> AppResult<FranchiseSummary> {
        let mut summaries = Vec::with_capacity(restaurants.len());
        for restaurant in restaurants {
            summaries.push(self.restaurant_summary(restaurant, from, to).await?);
        }

        summaries.sort_by(|a, b| b.gross_revenue.cmp(&a.gross_revenue));

        let order_count: u64 = summaries.iter().map(|s| s.order_count).sum();
        let gross_revenue: Decimal = summaries.iter().map(|s| s.gross_revenue).sum();
        let discount_total: Decimal = summaries.iter().map(|s| s.discount_total).sum();
        let average_ticket = if order_count > 0 {
            round2(gross_revenue / Decimal::from(order_count))
        } else {
            Decimal::ZERO
        };

        Ok(FranchiseSummary {
            franchise_code: franchise_code.to_string(),
            order_count,
            gross_revenue,
            discount_total,
            average_ticket,
            restaurants: summaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn restaurant() -> Restaurant {
        Restaurant {
            id: Some(RecordId::from_table_key("restaurant", "r1")),
            name: "El Rancho".to_string(),
            slug: "el-rancho".to_string(),
            description: None,
            timezone: "UTC".to_string(),
            currency: "EUR".to_string(),
            contact_email: None,
            contact_phone: None,
            franchise_code: Some("rancho".to_string()),
            is_active: true,
            created_at: 0,
        }
    }

    fn order(status: OrderStatus, total: &str, dish: &str, quantity: u32) -> Order {
        Order {
            id: None,
            restaurant: RecordId::from_table_key("restaurant", "r1"),
            location: None,
            customer_name: None,
            customer_phone: None,
            lines: vec![crate::db::models::OrderLine {
                dish: RecordId::from_table_key("dish", dish),
                dish_name: format!("Dish {dish}"),
                unit_price: dec(total),
                quantity,
                modifiers: vec![],
                note: None,
                discount: Decimal::ZERO,
                line_total: dec(total),
            }],
            subtotal: dec(total),
            discount_total: Decimal::ZERO,
            coupon_code: None,
            coupon_discount: Decimal::ZERO,
            total: dec(total),
            status,
            placed_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_summarize_counts_completed_only() {
        let orders = vec![
            order(OrderStatus::Completed, "20.00", "a", 2),
            order(OrderStatus::Completed, "10.00", "b", 1),
            order(OrderStatus::Cancelled, "99.00", "c", 1),
            order(OrderStatus::Placed, "5.00", "d", 1),
        ];
        let summary = summarize(&restaurant(), &orders);

        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.gross_revenue, dec("30.00"));
        assert_eq!(summary.average_ticket, dec("15.00"));
        assert_eq!(summary.orders_by_status.get("completed"), Some(&2));
        assert_eq!(summary.orders_by_status.get("cancelled"), Some(&1));
        assert_eq!(summary.orders_by_status.get("placed"), Some(&1));
    }

    #[test]
    fn test_summarize_top_dishes_sorted() {
        let orders = vec![
            order(OrderStatus::Completed, "10.00", "a", 1),
            order(OrderStatus::Completed, "10.00", "b", 5),
            order(OrderStatus::Completed, "10.00", "b", 2),
        ];
        let summary = summarize(&restaurant(), &orders);

        assert_eq!(summary.top_dishes[0].name, "Dish b");
        assert_eq!(summary.top_dishes[0].quantity, 7);
        assert_eq!(summary.top_dishes[1].quantity, 1);
    }

    #[test]
    fn test_empty_window() {
        let summary = summarize(&restaurant(), &[]);
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.average_ticket, Decimal::ZERO);
        assert!(summary.top_dishes.is_empty());
    }
}
