//! Order Model
//!
//! Orders are snapshots: dish names, prices and modifier deltas are
//! copied in at placement so later menu edits never change a placed
//! order.

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Valid forward transitions; `cancelled` is reachable from any
    /// non-terminal state.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, to) {
            (Placed, Accepted) => true,
            (Accepted, Preparing) => true,
            (Preparing, Ready) => true,
            (Ready, Completed) => true,
            (Placed | Accepted | Preparing | Ready, Cancelled) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Parse from the wire representation
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "placed" => Some(Self::Placed),
            "accepted" => Some(Self::Accepted),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Selected modifier item snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderModifier {
    /// Modifier item id within its group
    pub item_id: String,
    pub name: String,
    pub price_delta: Decimal,
}

/// One order line snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub dish: RecordId,
    pub dish_name: String,
    /// Dish base price + modifier deltas at placement time
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub modifiers: Vec<OrderModifier>,
    pub note: Option<String>,
    /// Deal discount applied to this line
    #[serde(default)]
    pub discount: Decimal,
    pub line_total: Decimal,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub location: Option<RecordId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    /// Deal discounts summed across lines
    #[serde(default)]
    pub discount_total: Decimal,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coupon_discount: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub placed_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Placed.can_transition(Accepted));
        assert!(Accepted.can_transition(Preparing));
        assert!(Preparing.can_transition(Ready));
        assert!(Ready.can_transition(Completed));
        assert!(Placed.can_transition(Cancelled));
        assert!(!Completed.can_transition(Cancelled));
        assert!(!Cancelled.can_transition(Placed));
        assert!(!Placed.can_transition(Ready));
    }
}
