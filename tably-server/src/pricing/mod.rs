//! Pricing Engine
//!
//! Cart quoting: line totals from dish prices and modifier deltas, deal
//! matching and stacking, coupon application. The storefront quote and
//! order-placement endpoints run the same code path.

pub mod calculator;
pub mod matcher;

pub use calculator::{PricedLine, PricedModifier, Quote, ResolvedLine, coupon_discount, quote};
pub use matcher::{LineTarget, is_time_valid, matches_scope};
