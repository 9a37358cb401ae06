//! Storefront API Handlers - the public customer ordering surface
//!
//! All routes here are unauthenticated and addressed by restaurant
//! slug. Quoting and order placement run the same resolution + pricing
//! path; the order is priced server-side regardless of what the client
//! displayed.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Coupon, Order, OrderLine, OrderModifier, OrderStatus, Restaurant};
use crate::db::repository::{
    CouponRepository, DealRepository, LocationRepository, OrderRepository, RestaurantRepository,
};
use crate::pricing;
use crate::services::menu_service::{MenuService, StorefrontMenu, resolve_cart};
use crate::utils::time::{now_millis, parse_tz};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

use shared::storefront::{QuoteLine, QuoteRequest, QuoteResponse};

const ORDER_RESOURCE: &str = "order";
const COUPON_RESOURCE: &str = "coupon";

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Instant to evaluate schedule windows at (Unix millis, default now)
    pub at: Option<i64>,
    /// Include menus outside their window, flagged `orderable_now: false`
    #[serde(default)]
    pub all: bool,
}

/// Order placement payload: a quote request plus customer details
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub cart: QuoteRequest,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Location ID ("location:xxx") for multi-site restaurants
    pub location_id: Option<String>,
    /// The total the customer saw; order is rejected if it drifted
    pub expected_total: Option<Decimal>,
}

async fn active_restaurant_by_slug(state: &ServerState, slug: &str) -> AppResult<Restaurant> {
    let repo = RestaurantRepository::new(state.get_db());
    let restaurant = repo
        .find_by_slug(slug)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant '{}' not found", slug)))?;

    if !restaurant.is_active {
        return Err(AppError::not_found(format!("Restaurant '{}' not found", slug)));
    }

    Ok(restaurant)
}

/// Look up the coupon for a cart, if any
async fn find_coupon(
    state: &ServerState,
    restaurant: &Restaurant,
    code: Option<&str>,
) -> AppResult<Option<Coupon>> {
    let Some(code) = code else { return Ok(None) };

    let restaurant_id = restaurant
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;

    let repo = CouponRepository::new(state.get_db());
    let coupon = repo
        .find_by_code(&restaurant_id, code)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Invalid coupon code '{}'", code)))?;

    Ok(Some(coupon))
}

/// Run resolution + pricing for a cart
async fn price_cart(
    state: &ServerState,
    restaurant: &Restaurant,
    cart: &QuoteRequest,
    at_millis: i64,
) -> AppResult<(pricing::Quote, Option<Coupon>)> {
    let menu_service = MenuService::new(state.get_db());
    let index = menu_service.build_index(restaurant, at_millis).await?;
    let resolved = resolve_cart(&index, &cart.lines)?;

    let restaurant_id = restaurant
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;
    let deal_repo = DealRepository::new(state.get_db());
    let deals = deal_repo
        .find_active_by_restaurant(&restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    let coupon = find_coupon(state, restaurant, cart.coupon_code.as_deref()).await?;

    let tz = parse_tz(&restaurant.timezone);
    let quote = pricing::quote(resolved, &deals, coupon.as_ref(), tz, at_millis)?;

    Ok((quote, coupon))
}

fn quote_response(quote: &pricing::Quote) -> QuoteResponse {
    QuoteResponse {
        lines: quote
            .lines
            .iter()
            .map(|line| QuoteLine {
                dish_id: line.dish.to_string(),
                dish_name: line.dish_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                applied_deals: line.applied_deals.clone(),
                discount: line.discount,
                line_total: line.line_total,
            })
            .collect(),
        subtotal: quote.subtotal,
        discount_total: quote.discount_total,
        coupon_code: quote.coupon_code.clone(),
        coupon_discount: quote.coupon_discount,
        total: quote.total,
    }
}

/// GET /api/storefront/:slug/menu - 顾客菜单
pub async fn menu(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<Vec<StorefrontMenu>>> {
    let restaurant = active_restaurant_by_slug(&state, &slug).await?;
    let at_millis = query.at.unwrap_or_else(now_millis);

    let menu_service = MenuService::new(state.get_db());
    let menus = menu_service
        .assemble(&restaurant, at_millis, query.all)
        .await?;
    Ok(Json(menus))
}

/// POST /api/storefront/:slug/quote - 购物车报价
pub async fn quote(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(cart): Json<QuoteRequest>,
) -> AppResult<Json<QuoteResponse>> {
    let restaurant = active_restaurant_by_slug(&state, &slug).await?;
    let (quote, _) = price_cart(&state, &restaurant, &cart, now_millis()).await?;
    Ok(Json(quote_response(&quote)))
}

/// POST /api/storefront/:slug/orders - 下单
///
/// 重新跑一遍与报价相同的定价；客户端声明的 expected_total 与服务端
/// 结果不一致时返回 409 (菜单或优惠在下单间隙变了)。
pub async fn place_order(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<Json<Order>> {
    validate_optional_text(&req.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;

    let restaurant = active_restaurant_by_slug(&state, &slug).await?;
    let restaurant_id = restaurant
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Restaurant row has no id"))?;

    // Optional location must belong to this restaurant
    let location = match req.location_id {
        Some(ref location_id) => {
            let location_repo = LocationRepository::new(state.get_db());
            let location = location_repo
                .find_by_id(location_id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
                .ok_or_else(|| {
                    AppError::validation(format!("Location {} not found", location_id))
                })?;
            if location.restaurant != restaurant_id {
                return Err(AppError::validation(
                    "Location belongs to a different restaurant",
                ));
            }
            location.id
        }
        None => None,
    };

    let placed_at = now_millis();
    let (quote, coupon) = price_cart(&state, &restaurant, &req.cart, placed_at).await?;

    if let Some(expected) = req.expected_total
        && expected != quote.total
    {
        return Err(AppError::conflict(format!(
            "Quoted total changed: expected {}, got {}",
            expected, quote.total
        )));
    }

    let lines: Vec<OrderLine> = quote
        .lines
        .iter()
        .map(|line| OrderLine {
            dish: line.dish.clone(),
            dish_name: line.dish_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            modifiers: line
                .modifiers
                .iter()
                .map(|m| OrderModifier {
                    item_id: m.item_id.clone(),
                    name: m.name.clone(),
                    price_delta: m.price_delta,
                })
                .collect(),
            note: line.note.clone(),
            discount: line.discount,
            line_total: line.line_total,
        })
        .collect();

    let order = Order {
        id: None,
        restaurant: restaurant_id,
        location,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        lines,
        subtotal: quote.subtotal,
        discount_total: quote.discount_total,
        coupon_code: quote.coupon_code.clone(),
        coupon_discount: quote.coupon_discount,
        total: quote.total,
        status: OrderStatus::Placed,
        placed_at,
        updated_at: placed_at,
    };

    let order_repo = OrderRepository::new(state.get_db());
    let created = order_repo.create(order).await.map_err(AppError::from)?;

    // Coupon redemption counts at placement, not at quoting
    if let Some(ref coupon) = coupon {
        let coupon_repo = CouponRepository::new(state.get_db());
        coupon_repo
            .record_redemption(coupon)
            .await
            .map_err(AppError::from)?;
        state.bump_version(COUPON_RESOURCE);
    }

    state.bump_version(ORDER_RESOURCE);

    tracing::info!(
        order_id = %created.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        restaurant = %slug,
        total = %created.total,
        "Order placed"
    );

    Ok(Json(created))
}
