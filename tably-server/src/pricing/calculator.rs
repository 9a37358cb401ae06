//! Quote Calculator
//!
//! Pure pricing arithmetic over resolved cart lines. All amounts are
//! decimals; percentage discounts round half-up to cents. A line's deal
//! discount never exceeds the line gross, and the coupon discount never
//! exceeds the remaining order total.

use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use surrealdb::RecordId;

use crate::db::models::{AdjustmentType, Coupon, Deal};
use crate::pricing::matcher::{LineTarget, is_time_valid, matches_scope};
use crate::utils::{AppError, AppResult};

/// Selected modifier with its price snapshot
#[derive(Debug, Clone)]
pub struct PricedModifier {
    pub item_id: String,
    pub name: String,
    pub price_delta: Decimal,
}

/// A cart line resolved against the live menu
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub target: LineTarget,
    pub dish_name: String,
    pub base_price: Decimal,
    pub quantity: u32,
    pub modifiers: Vec<PricedModifier>,
    pub note: Option<String>,
}

/// A fully priced line
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub dish: RecordId,
    pub dish_name: String,
    /// Base price + modifier deltas
    pub unit_price: Decimal,
    pub quantity: u32,
    pub modifiers: Vec<PricedModifier>,
    pub note: Option<String>,
    pub applied_deals: Vec<String>,
    pub discount: Decimal,
    pub line_total: Decimal,
}

/// A fully priced cart
#[derive(Debug, Clone)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub total: Decimal,
}

/// Round to cents, half away from zero
fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Discount a single deal yields on a line gross
fn deal_discount(deal: &Deal, gross: Decimal) -> Decimal {
    let raw = match deal.adjustment_type {
        AdjustmentType::Percentage => gross * deal.adjustment_value / Decimal::from(100),
        AdjustmentType::FixedAmount => deal.adjustment_value,
    };
    round2(raw).min(gross)
}

/// Price one resolved line against the active deals
fn price_line(line: ResolvedLine, deals: &[Deal], tz: Tz, at_millis: i64) -> PricedLine {
    let unit_price = line.base_price
        + line
            .modifiers
            .iter()
            .map(|m| m.price_delta)
            .sum::<Decimal>();
    let gross = round2(unit_price * Decimal::from(line.quantity));

    let candidates: Vec<&Deal> = deals
        .iter()
        .filter(|d| matches_scope(d, &line.target) && is_time_valid(d, at_millis, tz))
        .collect();

    let mut applied_deals = Vec::new();
    let mut discount = Decimal::ZERO;

    // Exactly one non-stackable deal may apply: highest priority wins,
    // ties broken by the larger discount.
    let best_exclusive = candidates
        .iter()
        .filter(|d| !d.is_stackable)
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(deal_discount(a, gross).cmp(&deal_discount(b, gross)))
        });
    if let Some(deal) = best_exclusive {
        applied_deals.push(deal.name.clone());
        discount += deal_discount(deal, gross);
    }

    // Stackable deals apply on top, in priority order
    let mut stackables: Vec<&&Deal> = candidates.iter().filter(|d| d.is_stackable).collect();
    stackables.sort_by(|a, b| b.priority.cmp(&a.priority));
    for deal in stackables {
        applied_deals.push(deal.name.clone());
        discount += deal_discount(deal, gross);
    }

    let discount = discount.min(gross);
    let line_total = gross - discount;

    PricedLine {
        dish: line.target.dish.clone(),
        dish_name: line.dish_name,
        unit_price,
        quantity: line.quantity,
        modifiers: line.modifiers,
        note: line.note,
        applied_deals,
        discount,
        line_total,
    }
}

/// Validate a coupon against the post-deal subtotal; returns its discount
pub fn coupon_discount(coupon: &Coupon, subtotal: Decimal, at_millis: i64) -> AppResult<Decimal> {
    if !coupon.is_active {
        return Err(AppError::business_rule("Coupon is no longer active"));
    }
    if let Some(from) = coupon.valid_from
        && at_millis < from
    {
        return Err(AppError::business_rule("Coupon is not yet active"));
    }
    if let Some(until) = coupon.valid_until
        && at_millis >= until
    {
        return Err(AppError::business_rule("Coupon has expired"));
    }
    if let Some(max) = coupon.max_redemptions
        && coupon.redeemed_count >= max
    {
        return Err(AppError::business_rule("Coupon redemption limit reached"));
    }
    if let Some(min) = coupon.min_subtotal
        && subtotal < min
    {
        return Err(AppError::business_rule(format!(
            "Coupon requires a minimum subtotal of {}",
            min
        )));
    }

    let raw = match coupon.adjustment_type {
        AdjustmentType::Percentage => subtotal * coupon.adjustment_value / Decimal::from(100),
        AdjustmentType::FixedAmount => coupon.adjustment_value,
    };
    Ok(round2(raw).min(subtotal))
}

/// Price a resolved cart: deals per line, then the coupon on the
/// post-deal subtotal.
pub fn quote(
    lines: Vec<ResolvedLine>,
    deals: &[Deal],
    coupon: Option<&Coupon>,
    tz: Tz,
    at_millis: i64,
) -> AppResult<Quote> {
    if lines.is_empty() {
        return Err(AppError::validation("Cart must contain at least one line"));
    }

    let priced: Vec<PricedLine> = lines
        .into_iter()
        .map(|line| price_line(line, deals, tz, at_millis))
        .collect();

    let subtotal: Decimal = priced.iter().map(|l| l.line_total).sum();
    let discount_total: Decimal = priced.iter().map(|l| l.discount).sum();

    let (coupon_code, coupon_amount) = match coupon {
        Some(coupon) => (
            Some(coupon.code.clone()),
            coupon_discount(coupon, subtotal, at_millis)?,
        ),
        None => (None, Decimal::ZERO),
    };

    let total = subtotal - coupon_amount;

    Ok(Quote {
        lines: priced,
        subtotal,
        discount_total,
        coupon_code,
        coupon_discount: coupon_amount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DealScope;

    fn record(table: &str, key: &str) -> RecordId {
        RecordId::from_table_key(table, key)
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn resolved_line(key: &str, price: &str, quantity: u32) -> ResolvedLine {
        ResolvedLine {
            target: LineTarget {
                dish: record("dish", key),
                course: record("course", "c1"),
                menu: record("menu", "m1"),
            },
            dish_name: format!("Dish {key}"),
            base_price: dec(price),
            quantity,
            modifiers: vec![],
            note: None,
        }
    }

    fn percent_deal(name: &str, value: &str, stackable: bool, priority: i32) -> Deal {
        Deal {
            id: None,
            restaurant: record("restaurant", "r1"),
            name: name.to_string(),
            description: None,
            scope: DealScope::Global,
            target: None,
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: dec(value),
            window: None,
            valid_from: None,
            valid_until: None,
            is_stackable: stackable,
            priority,
            is_active: true,
            created_at: 0,
        }
    }

    fn coupon(adjustment_type: AdjustmentType, value: &str) -> Coupon {
        Coupon {
            id: None,
            restaurant: record("restaurant", "r1"),
            code: "WELCOME".to_string(),
            adjustment_type,
            adjustment_value: dec(value),
            min_subtotal: None,
            max_redemptions: None,
            redeemed_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_plain_line_totals() {
        let quote = quote(
            vec![resolved_line("d1", "10.50", 2), resolved_line("d2", "4.25", 1)],
            &[],
            None,
            Tz::UTC,
            0,
        )
        .unwrap();

        assert_eq!(quote.subtotal, dec("25.25"));
        assert_eq!(quote.discount_total, Decimal::ZERO);
        assert_eq!(quote.total, dec("25.25"));
    }

    #[test]
    fn test_modifiers_feed_unit_price() {
        let mut line = resolved_line("d1", "8.00", 2);
        line.modifiers.push(PricedModifier {
            item_id: "m1".to_string(),
            name: "Extra cheese".to_string(),
            price_delta: dec("1.50"),
        });

        let quote = quote(vec![line], &[], None, Tz::UTC, 0).unwrap();
        assert_eq!(quote.lines[0].unit_price, dec("9.50"));
        assert_eq!(quote.total, dec("19.00"));
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 10% of 11.11 = 1.111 -> 1.11; 15% of 3.33 = 0.4995 -> 0.50
        let quote = quote(
            vec![resolved_line("d1", "3.33", 1)],
            &[percent_deal("off", "15", false, 0)],
            None,
            Tz::UTC,
            0,
        )
        .unwrap();
        assert_eq!(quote.lines[0].discount, dec("0.50"));
        assert_eq!(quote.total, dec("2.83"));
    }

    #[test]
    fn test_exclusive_deal_priority_wins() {
        let deals = vec![
            percent_deal("small", "5", false, 1),
            percent_deal("big", "50", false, 10),
        ];
        let quote = quote(
            vec![resolved_line("d1", "10.00", 1)],
            &deals,
            None,
            Tz::UTC,
            0,
        )
        .unwrap();

        // Only the high-priority exclusive deal applies
        assert_eq!(quote.lines[0].applied_deals, vec!["big".to_string()]);
        assert_eq!(quote.lines[0].discount, dec("5.00"));
    }

    #[test]
    fn test_stackables_apply_on_top() {
        let deals = vec![
            percent_deal("exclusive", "10", false, 5),
            percent_deal("stack", "5", true, 0),
        ];
        let quote = quote(
            vec![resolved_line("d1", "20.00", 1)],
            &deals,
            None,
            Tz::UTC,
            0,
        )
        .unwrap();

        assert_eq!(quote.lines[0].applied_deals.len(), 2);
        // 10% + 5% of gross = 2.00 + 1.00
        assert_eq!(quote.lines[0].discount, dec("3.00"));
        assert_eq!(quote.total, dec("17.00"));
    }

    #[test]
    fn test_discount_capped_at_line_gross() {
        let mut fixed = percent_deal("huge", "1", true, 0);
        fixed.adjustment_type = AdjustmentType::FixedAmount;
        fixed.adjustment_value = dec("100.00");

        let quote = quote(
            vec![resolved_line("d1", "6.00", 1)],
            &[fixed],
            None,
            Tz::UTC,
            0,
        )
        .unwrap();
        assert_eq!(quote.lines[0].discount, dec("6.00"));
        assert_eq!(quote.total, Decimal::ZERO);
    }

    #[test]
    fn test_coupon_percentage() {
        let c = coupon(AdjustmentType::Percentage, "10");
        let quote = quote(
            vec![resolved_line("d1", "30.00", 1)],
            &[],
            Some(&c),
            Tz::UTC,
            0,
        )
        .unwrap();
        assert_eq!(quote.coupon_discount, dec("3.00"));
        assert_eq!(quote.total, dec("27.00"));
    }

    #[test]
    fn test_coupon_fixed_capped_at_subtotal() {
        let c = coupon(AdjustmentType::FixedAmount, "50.00");
        let quote = quote(
            vec![resolved_line("d1", "8.00", 1)],
            &[],
            Some(&c),
            Tz::UTC,
            0,
        )
        .unwrap();
        assert_eq!(quote.coupon_discount, dec("8.00"));
        assert_eq!(quote.total, Decimal::ZERO);
    }

    #[test]
    fn test_coupon_min_subtotal_enforced() {
        let mut c = coupon(AdjustmentType::Percentage, "10");
        c.min_subtotal = Some(dec("50.00"));

        let result = quote(
            vec![resolved_line("d1", "8.00", 1)],
            &[],
            Some(&c),
            Tz::UTC,
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_coupon_redemption_limit() {
        let mut c = coupon(AdjustmentType::Percentage, "10");
        c.max_redemptions = Some(3);
        c.redeemed_count = 3;

        let result = quote(
            vec![resolved_line("d1", "8.00", 1)],
            &[],
            Some(&c),
            Tz::UTC,
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_coupon_expiry_window() {
        let mut c = coupon(AdjustmentType::Percentage, "10");
        c.valid_until = Some(1000);

        let result = quote(
            vec![resolved_line("d1", "8.00", 1)],
            &[],
            Some(&c),
            Tz::UTC,
            1000,
        );
        assert!(result.is_err(), "valid_until is exclusive");
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(quote(vec![], &[], None, Tz::UTC, 0).is_err());
    }
}
