//! Customer-facing storefront types
//!
//! Cart and quote payloads for the public ordering surface. Prices are
//! decimals end-to-end; the tablet and web clients never do arithmetic
//! on floats.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One selected modifier item within a cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartModifier {
    /// Modifier group id ("modifier_group:xxx")
    pub group_id: String,
    /// Selected item ids within the group
    pub item_ids: Vec<String>,
}

/// One line of a customer cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Dish id ("dish:xxx")
    pub dish_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub modifiers: Vec<CartModifier>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Quote request for a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Priced line in a quote response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub dish_id: String,
    pub dish_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// Deal names applied to this line, in application order
    #[serde(default)]
    pub applied_deals: Vec<String>,
    pub discount: Decimal,
    pub line_total: Decimal,
}

/// Quote response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub total: Decimal,
}
