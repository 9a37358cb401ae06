//! Deal Matcher
//!
//! Logic for matching deals to cart lines and checking time validity.

use chrono_tz::Tz;
use surrealdb::RecordId;

use crate::db::models::{Deal, DealScope};
use crate::utils::time::{local_parts, parse_hhmm, window_contains};

/// Where a cart line sits in the menu tree
#[derive(Debug, Clone)]
pub struct LineTarget {
    pub dish: RecordId,
    pub course: RecordId,
    pub menu: RecordId,
}

/// Check if a deal matches a line based on its scope
pub fn matches_scope(deal: &Deal, target: &LineTarget) -> bool {
    match deal.scope {
        DealScope::Global => true,
        DealScope::Menu => deal.target.as_ref() == Some(&target.menu),
        DealScope::Course => deal.target.as_ref() == Some(&target.course),
        DealScope::Dish => deal.target.as_ref() == Some(&target.dish),
    }
}

/// Check if a deal is active at `at_millis` in the restaurant's timezone
///
/// Both constraints must hold:
/// - validity range (`valid_from` inclusive, `valid_until` exclusive)
/// - weekly window (days + HH:MM range, overnight allowed)
pub fn is_time_valid(deal: &Deal, at_millis: i64, tz: Tz) -> bool {
    if let Some(from) = deal.valid_from
        && at_millis < from
    {
        return false;
    }
    if let Some(until) = deal.valid_until
        && at_millis >= until
    {
        return false;
    }

    if let Some(ref window) = deal.window {
        let (weekday, time) = local_parts(at_millis, tz);

        if !window.days.is_empty() && !window.days.contains(&weekday) {
            return false;
        }

        if let (Some(start), Some(end)) = (&window.start, &window.end)
            && let (Ok(start_time), Ok(end_time)) = (parse_hhmm(start), parse_hhmm(end))
            && !window_contains(start_time, end_time, time)
        {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AdjustmentType, WeeklyWindow};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn record(table: &str, key: &str) -> RecordId {
        RecordId::from_table_key(table, key)
    }

    fn make_deal(scope: DealScope, target: Option<RecordId>) -> Deal {
        Deal {
            id: None,
            restaurant: record("restaurant", "r1"),
            name: "test".to_string(),
            description: None,
            scope,
            target,
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: Decimal::from(10),
            window: None,
            valid_from: None,
            valid_until: None,
            is_stackable: false,
            priority: 0,
            is_active: true,
            created_at: 0,
        }
    }

    fn line_target() -> LineTarget {
        LineTarget {
            dish: record("dish", "d1"),
            course: record("course", "c1"),
            menu: record("menu", "m1"),
        }
    }

    #[test]
    fn test_global_scope_matches_all() {
        let deal = make_deal(DealScope::Global, None);
        assert!(matches_scope(&deal, &line_target()));
    }

    #[test]
    fn test_dish_scope_matches_specific() {
        let deal = make_deal(DealScope::Dish, Some(record("dish", "d1")));
        assert!(matches_scope(&deal, &line_target()));

        let other = make_deal(DealScope::Dish, Some(record("dish", "other")));
        assert!(!matches_scope(&other, &line_target()));
    }

    #[test]
    fn test_course_and_menu_scope() {
        let course_deal = make_deal(DealScope::Course, Some(record("course", "c1")));
        assert!(matches_scope(&course_deal, &line_target()));

        let menu_deal = make_deal(DealScope::Menu, Some(record("menu", "m2")));
        assert!(!matches_scope(&menu_deal, &line_target()));
    }

    /// 2025-06-11 is a Wednesday
    fn wednesday_noon_utc() -> i64 {
        chrono::Utc
            .with_ymd_and_hms(2025, 6, 11, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_validity_range() {
        let at = wednesday_noon_utc();
        let mut deal = make_deal(DealScope::Global, None);

        deal.valid_from = Some(at + 1);
        assert!(!is_time_valid(&deal, at, Tz::UTC));

        deal.valid_from = Some(at - 1000);
        deal.valid_until = Some(at + 1000);
        assert!(is_time_valid(&deal, at, Tz::UTC));

        deal.valid_until = Some(at);
        assert!(!is_time_valid(&deal, at, Tz::UTC), "valid_until is exclusive");
    }

    #[test]
    fn test_weekly_window_days() {
        let at = wednesday_noon_utc();
        let mut deal = make_deal(DealScope::Global, None);

        deal.window = Some(WeeklyWindow {
            days: vec![3], // Wednesday
            start: None,
            end: None,
        });
        assert!(is_time_valid(&deal, at, Tz::UTC));

        deal.window = Some(WeeklyWindow {
            days: vec![1, 2], // Monday, Tuesday
            start: None,
            end: None,
        });
        assert!(!is_time_valid(&deal, at, Tz::UTC));
    }

    #[test]
    fn test_weekly_window_hours() {
        let at = wednesday_noon_utc();
        let mut deal = make_deal(DealScope::Global, None);

        deal.window = Some(WeeklyWindow {
            days: vec![],
            start: Some("11:00".to_string()),
            end: Some("15:00".to_string()),
        });
        assert!(is_time_valid(&deal, at, Tz::UTC));

        deal.window = Some(WeeklyWindow {
            days: vec![],
            start: Some("18:00".to_string()),
            end: Some("22:00".to_string()),
        });
        assert!(!is_time_valid(&deal, at, Tz::UTC));
    }

    #[test]
    fn test_overnight_window() {
        // 22:00-02:00 window, checked at 23:30 UTC Wednesday
        let at = chrono::Utc
            .with_ymd_and_hms(2025, 6, 11, 23, 30, 0)
            .unwrap()
            .timestamp_millis();
        let mut deal = make_deal(DealScope::Global, None);
        deal.window = Some(WeeklyWindow {
            days: vec![],
            start: Some("22:00".to_string()),
            end: Some("02:00".to_string()),
        });
        assert!(is_time_valid(&deal, at, Tz::UTC));
    }
}
