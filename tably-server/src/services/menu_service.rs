//! Menu Service - storefront menu assembly and cart resolution
//!
//! Assembles the customer-facing menu tree (menus → courses → dishes →
//! modifier groups) and resolves incoming carts against it. Both the
//! quote and order-placement endpoints go through [`resolve_cart`], so
//! an order can never reference a dish the storefront would not show.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{ModifierGroup, Restaurant, Schedule};
use crate::db::repository::{
    CourseRepository, DishRepository, MenuRepository, ModifierGroupRepository, ScheduleRepository,
};
use crate::pricing::{LineTarget, PricedModifier, ResolvedLine};
use crate::utils::validation::MAX_NOTE_LEN;
use crate::utils::{AppError, AppResult};
use crate::utils::time::{local_parts, parse_hhmm};
use shared::storefront::CartLine;

/// Hard cap on a single line's quantity
const MAX_LINE_QUANTITY: u32 = 99;

// =============================================================================
// Storefront output types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontModifierItem {
    pub id: String,
    pub name: String,
    pub price_delta: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontModifierGroup {
    pub id: String,
    pub name: String,
    pub min_select: u32,
    pub max_select: u32,
    pub items: Vec<StorefrontModifierItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontDish {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
    pub dietary_tags: Vec<String>,
    pub modifier_groups: Vec<StorefrontModifierGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontCourse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub dishes: Vec<StorefrontDish>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorefrontMenu {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub orderable_now: bool,
    pub courses: Vec<StorefrontCourse>,
}

// =============================================================================
// Schedule windows
// =============================================================================

/// Whether a schedule has an open block at (weekday, time)
///
/// Overnight blocks cover `[open, midnight)` on their weekday and
/// `[midnight, close)` on the following day.
pub fn schedule_is_open(schedule: &Schedule, weekday: u8, time: chrono::NaiveTime) -> bool {
    if !schedule.is_active {
        return false;
    }
    schedule.blocks.iter().any(|block| {
        let open = match parse_hhmm(&block.open) {
            Ok(t) => t,
            Err(_) => return false,
        };
        let close = match parse_hhmm(&block.close) {
            Ok(t) => t,
            Err(_) => return false,
        };
        if open < close {
            block.weekday == weekday && time >= open && time < close
        } else {
            (block.weekday == weekday && time >= open)
                || ((block.weekday + 1) % 7 == weekday && time < close)
        }
    })
}

// =============================================================================
// Assembly
// =============================================================================

/// Cart resolution context for one orderable dish
#[derive(Debug, Clone)]
pub struct DishContext {
    pub target: LineTarget,
    pub dish_name: String,
    pub base_price: Decimal,
    pub groups: Vec<ModifierGroup>,
}

/// Dish-id keyed lookup over the orderable menu tree
#[derive(Debug, Default)]
pub struct MenuIndex {
    dishes: HashMap<String, DishContext>,
}

impl MenuIndex {
    pub fn get(&self, dish_id: &str) -> Option<&DishContext> {
        self.dishes.get(dish_id)
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}

pub struct MenuService {
    db: Surreal<Db>,
}

impl MenuService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Assemble the storefront menu tree for a restaurant
    ///
    /// Menus outside their schedule window at `at_millis` are skipped
    /// unless `include_all` is set (admin preview), in which case they
    /// are returned with `orderable_now = false`.
    pub async fn assemble(
        &self,
        restaurant: &Restaurant,
        at_millis: i64,
        include_all: bool,
    ) -> AppResult<Vec<StorefrontMenu>> {
        let restaurant_id = restaurant
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;
        let tz = crate::utils::time::parse_tz(&restaurant.timezone);
        let (weekday, time) = local_parts(at_millis, tz);

        let menu_repo = MenuRepository::new(self.db.clone());
        let course_repo = CourseRepository::new(self.db.clone());
        let dish_repo = DishRepository::new(self.db.clone());
        let group_repo = ModifierGroupRepository::new(self.db.clone());
        let schedule_repo = ScheduleRepository::new(self.db.clone());

        let menus = menu_repo
            .find_active_by_restaurant(&restaurant_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        // Resolve schedule links in one query
        let schedule_ids: Vec<RecordId> = menus.iter().filter_map(|m| m.schedule.clone()).collect();
        let schedules: HashMap<String, Schedule> = schedule_repo
            .find_by_ids(&schedule_ids)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .into_iter()
            .filter_map(|s| s.id.clone().map(|id| (id.to_string(), s)))
            .collect();

        let mut output = Vec::new();
        for menu in menus {
            let orderable_now = match &menu.schedule {
                None => true,
                Some(schedule_id) => schedules
                    .get(&schedule_id.to_string())
                    .map(|s| schedule_is_open(s, weekday, time))
                    // Dangling schedule link - treat as always open
                    .unwrap_or(true),
            };

            if !orderable_now && !include_all {
                continue;
            }

            let menu_id = match &menu.id {
                Some(id) => id.clone(),
                None => continue,
            };

            let courses = course_repo
                .find_active_by_menu(&menu_id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            let mut out_courses = Vec::new();
            for course in courses {
                let course_id = match &course.id {
                    Some(id) => id.clone(),
                    None => continue,
                };
                let dishes = dish_repo
                    .find_active_by_course(&course_id)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;

                // Fetch every referenced modifier group once per course
                let group_ids: Vec<RecordId> = dishes
                    .iter()
                    .flat_map(|d| d.modifier_groups.iter().cloned())
                    .collect();
                let groups: HashMap<String, ModifierGroup> = group_repo
                    .find_by_ids(&group_ids)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?
                    .into_iter()
                    .filter_map(|g| g.id.clone().map(|id| (id.to_string(), g)))
                    .collect();

                let out_dishes: Vec<StorefrontDish> = dishes
                    .into_iter()
                    .filter_map(|dish| {
                        let dish_id = dish.id.as_ref()?.to_string();
                        let modifier_groups = dish
                            .modifier_groups
                            .iter()
                            // Links to missing groups are skipped
                            .filter_map(|gid| groups.get(&gid.to_string()))
                            .map(storefront_group)
                            .collect();
                        Some(StorefrontDish {
                            id: dish_id,
                            name: dish.name,
                            description: dish.description,
                            price: dish.price,
                            image: dish.image,
                            dietary_tags: dish.dietary_tags,
                            modifier_groups,
                        })
                    })
                    .collect();

                out_courses.push(StorefrontCourse {
                    id: course_id.to_string(),
                    name: course.name,
                    description: course.description,
                    dishes: out_dishes,
                });
            }

            output.push(StorefrontMenu {
                id: menu_id.to_string(),
                name: menu.name,
                description: menu.description,
                orderable_now,
                courses: out_courses,
            });
        }

        Ok(output)
    }

    /// Build the dish lookup for cart resolution (orderable menus only)
    pub async fn build_index(
        &self,
        restaurant: &Restaurant,
        at_millis: i64,
    ) -> AppResult<MenuIndex> {
        let restaurant_id = restaurant
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;
        let tz = crate::utils::time::parse_tz(&restaurant.timezone);
        let (weekday, time) = local_parts(at_millis, tz);

        let menu_repo = MenuRepository::new(self.db.clone());
        let course_repo = CourseRepository::new(self.db.clone());
        let dish_repo = DishRepository::new(self.db.clone());
        let group_repo = ModifierGroupRepository::new(self.db.clone());
        let schedule_repo = ScheduleRepository::new(self.db.clone());

        let menus = menu_repo
            .find_active_by_restaurant(&restaurant_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let schedule_ids: Vec<RecordId> = menus.iter().filter_map(|m| m.schedule.clone()).collect();
        let schedules: HashMap<String, Schedule> = schedule_repo
            .find_by_ids(&schedule_ids)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .into_iter()
            .filter_map(|s| s.id.clone().map(|id| (id.to_string(), s)))
            .collect();

        let mut index = MenuIndex::default();
        for menu in menus {
            let orderable = match &menu.schedule {
                None => true,
                Some(schedule_id) => schedules
                    .get(&schedule_id.to_string())
                    .map(|s| schedule_is_open(s, weekday, time))
                    .unwrap_or(true),
            };
            if !orderable {
                continue;
            }
            let menu_id = match &menu.id {
                Some(id) => id.clone(),
                None => continue,
            };

            let courses = course_repo
                .find_active_by_menu(&menu_id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            for course in courses {
                let course_id = match &course.id {
                    Some(id) => id.clone(),
                    None => continue,
                };
                let dishes = dish_repo
                    .find_active_by_course(&course_id)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;

                let group_ids: Vec<RecordId> = dishes
                    .iter()
                    .flat_map(|d| d.modifier_groups.iter().cloned())
                    .collect();
                let groups: HashMap<String, ModifierGroup> = group_repo
                    .find_by_ids(&group_ids)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?
                    .into_iter()
                    .filter_map(|g| g.id.clone().map(|id| (id.to_string(), g)))
                    .collect();

                for dish in dishes {
                    let dish_id = match &dish.id {
                        Some(id) => id.clone(),
                        None => continue,
                    };
                    let dish_groups: Vec<ModifierGroup> = dish
                        .modifier_groups
                        .iter()
                        .filter_map(|gid| groups.get(&gid.to_string()).cloned())
                        .collect();
                    index.dishes.insert(
                        dish_id.to_string(),
                        DishContext {
                            target: LineTarget {
                                dish: dish_id,
                                course: course_id.clone(),
                                menu: menu_id.clone(),
                            },
                            dish_name: dish.name,
                            base_price: dish.price,
                            groups: dish_groups,
                        },
                    );
                }
            }
        }

        Ok(index)
    }
}

fn storefront_group(group: &ModifierGroup) -> StorefrontModifierGroup {
    let mut items: Vec<_> = group
        .items
        .iter()
        .filter(|item| item.is_active)
        .collect();
    items.sort_by_key(|item| item.sort_order);

    StorefrontModifierGroup {
        id: group
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        name: group.name.clone(),
        min_select: group.min_select,
        max_select: group.max_select,
        items: items
            .into_iter()
            .map(|item| StorefrontModifierItem {
                id: item.id.clone(),
                name: item.name.clone(),
                price_delta: item.price_delta,
            })
            .collect(),
    }
}

// =============================================================================
// Cart resolution
// =============================================================================

/// Resolve a customer cart against the orderable menu
///
/// Validates every line: the dish must be orderable, quantities sane,
/// and each modifier group's selection rule satisfied. Errors name the
/// offending line index.
pub fn resolve_cart(index: &MenuIndex, lines: &[CartLine]) -> AppResult<Vec<ResolvedLine>> {
    if lines.is_empty() {
        return Err(AppError::validation("Cart must contain at least one line"));
    }

    let mut resolved = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let context = index.get(&line.dish_id).ok_or_else(|| {
            AppError::validation(format!(
                "Line {}: dish {} is not currently orderable",
                idx, line.dish_id
            ))
        })?;

        if line.quantity == 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::validation(format!(
                "Line {}: quantity must be between 1 and {}",
                idx, MAX_LINE_QUANTITY
            )));
        }

        if let Some(ref note) = line.note
            && note.len() > MAX_NOTE_LEN
        {
            return Err(AppError::validation(format!(
                "Line {}: note is too long (max {} chars)",
                idx, MAX_NOTE_LEN
            )));
        }

        // Selections referencing groups not attached to the dish are invalid
        for selection in &line.modifiers {
            if !context
                .groups
                .iter()
                .any(|g| g.id.as_ref().map(|id| id.to_string()).as_deref()
                    == Some(selection.group_id.as_str()))
            {
                return Err(AppError::validation(format!(
                    "Line {}: modifier group {} is not available for this dish",
                    idx, selection.group_id
                )));
            }
        }

        let mut modifiers = Vec::new();
        for group in &context.groups {
            let group_id = group
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();
            let selected_ids: &[String] = line
                .modifiers
                .iter()
                .find(|s| s.group_id == group_id)
                .map(|s| s.item_ids.as_slice())
                .unwrap_or(&[]);

            let count = selected_ids.len() as u32;
            if count < group.min_select {
                return Err(AppError::validation(format!(
                    "Line {}: group '{}' requires at least {} selection(s)",
                    idx, group.name, group.min_select
                )));
            }
            if group.max_select != 0 && count > group.max_select {
                return Err(AppError::validation(format!(
                    "Line {}: group '{}' allows at most {} selection(s)",
                    idx, group.name, group.max_select
                )));
            }

            for item_id in selected_ids {
                let item = group
                    .items
                    .iter()
                    .find(|item| &item.id == item_id && item.is_active)
                    .ok_or_else(|| {
                        AppError::validation(format!(
                            "Line {}: unknown modifier item {} in group '{}'",
                            idx, item_id, group.name
                        ))
                    })?;
                modifiers.push(PricedModifier {
                    item_id: item.id.clone(),
                    name: item.name.clone(),
                    price_delta: item.price_delta,
                });
            }
        }

        resolved.push(ResolvedLine {
            target: context.target.clone(),
            dish_name: context.dish_name.clone(),
            base_price: context.base_price,
            quantity: line.quantity,
            modifiers,
            note: line.note.clone(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ModifierItem, ScheduleBlock};
    use shared::storefront::CartModifier;

    fn t(h: u32, m: u32) -> chrono::NaiveTime {
        chrono::NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule_with(blocks: Vec<ScheduleBlock>) -> Schedule {
        Schedule {
            id: None,
            restaurant: RecordId::from_table_key("restaurant", "r1"),
            name: "Lunch".to_string(),
            blocks,
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_schedule_open_same_day() {
        let schedule = schedule_with(vec![ScheduleBlock {
            weekday: 3,
            open: "11:00".to_string(),
            close: "15:00".to_string(),
        }]);
        assert!(schedule_is_open(&schedule, 3, t(12, 0)));
        assert!(!schedule_is_open(&schedule, 3, t(15, 0)));
        assert!(!schedule_is_open(&schedule, 4, t(12, 0)));
    }

    #[test]
    fn test_schedule_overnight_spills_into_next_day() {
        let schedule = schedule_with(vec![ScheduleBlock {
            weekday: 5, // Friday 22:00 - Saturday 02:00
            open: "22:00".to_string(),
            close: "02:00".to_string(),
        }]);
        assert!(schedule_is_open(&schedule, 5, t(23, 0)));
        assert!(schedule_is_open(&schedule, 6, t(1, 30)));
        assert!(!schedule_is_open(&schedule, 6, t(3, 0)));
    }

    #[test]
    fn test_inactive_schedule_never_open() {
        let mut schedule = schedule_with(vec![ScheduleBlock {
            weekday: 3,
            open: "00:00".to_string(),
            close: "23:59".to_string(),
        }]);
        schedule.is_active = false;
        assert!(!schedule_is_open(&schedule, 3, t(12, 0)));
    }

    fn index_with_dish(groups: Vec<ModifierGroup>) -> MenuIndex {
        let mut index = MenuIndex::default();
        index.dishes.insert(
            "dish:d1".to_string(),
            DishContext {
                target: LineTarget {
                    dish: RecordId::from_table_key("dish", "d1"),
                    course: RecordId::from_table_key("course", "c1"),
                    menu: RecordId::from_table_key("menu", "m1"),
                },
                dish_name: "Paella".to_string(),
                base_price: "14.50".parse().unwrap(),
                groups,
            },
        );
        index
    }

    fn group_with_items(min_select: u32, max_select: u32) -> ModifierGroup {
        ModifierGroup {
            id: Some(RecordId::from_table_key("modifier_group", "g1")),
            restaurant: RecordId::from_table_key("restaurant", "r1"),
            name: "Toppings".to_string(),
            min_select,
            max_select,
            items: vec![
                ModifierItem {
                    id: "item-a".to_string(),
                    name: "Aioli".to_string(),
                    price_delta: "0.50".parse().unwrap(),
                    sort_order: 0,
                    is_active: true,
                },
                ModifierItem {
                    id: "item-b".to_string(),
                    name: "Lemon".to_string(),
                    price_delta: Decimal::ZERO,
                    sort_order: 1,
                    is_active: false,
                },
            ],
            is_active: true,
            created_at: 0,
        }
    }

    fn cart_line(dish_id: &str, quantity: u32, modifiers: Vec<CartModifier>) -> CartLine {
        CartLine {
            dish_id: dish_id.to_string(),
            quantity,
            modifiers,
            note: None,
        }
    }

    #[test]
    fn test_resolve_unknown_dish_rejected() {
        let index = index_with_dish(vec![]);
        let result = resolve_cart(&index, &[cart_line("dish:nope", 1, vec![])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_min_select_enforced() {
        let index = index_with_dish(vec![group_with_items(1, 0)]);
        let result = resolve_cart(&index, &[cart_line("dish:d1", 1, vec![])]);
        assert!(result.is_err(), "empty selection violates min_select");
    }

    #[test]
    fn test_resolve_inactive_item_rejected() {
        let index = index_with_dish(vec![group_with_items(0, 0)]);
        let result = resolve_cart(
            &index,
            &[cart_line(
                "dish:d1",
                1,
                vec![CartModifier {
                    group_id: "modifier_group:g1".to_string(),
                    item_ids: vec!["item-b".to_string()],
                }],
            )],
        );
        assert!(result.is_err(), "inactive item must not resolve");
    }

    #[test]
    fn test_resolve_happy_path_snapshots_prices() {
        let index = index_with_dish(vec![group_with_items(0, 2)]);
        let resolved = resolve_cart(
            &index,
            &[cart_line(
                "dish:d1",
                2,
                vec![CartModifier {
                    group_id: "modifier_group:g1".to_string(),
                    item_ids: vec!["item-a".to_string()],
                }],
            )],
        )
        .unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].dish_name, "Paella");
        assert_eq!(resolved[0].modifiers.len(), 1);
        assert_eq!(resolved[0].modifiers[0].price_delta, "0.50".parse().unwrap());
    }

    #[test]
    fn test_resolve_foreign_group_rejected() {
        let index = index_with_dish(vec![]);
        let result = resolve_cart(
            &index,
            &[cart_line(
                "dish:d1",
                1,
                vec![CartModifier {
                    group_id: "modifier_group:other".to_string(),
                    item_ids: vec!["x".to_string()],
                }],
            )],
        );
        assert!(result.is_err());
    }
}
