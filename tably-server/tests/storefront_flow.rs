//! End-to-end storefront flow: menu assembly, quoting, order placement
//! and order lifecycle, driven through the assembled router.

mod common;

use http::StatusCode;
use serde_json::json;

use common::{admin_token, request, router, seed_simple_menu, test_state};
use tably_server::db::models::{CouponCreate, DealCreate, Restaurant};
use tably_server::db::repository::{CouponRepository, DealRepository};

async fn seed_global_deal(state: &tably_server::ServerState, restaurant: &Restaurant) {
    let repo = DealRepository::new(state.get_db());
    repo.create(DealCreate {
        restaurant_id: restaurant.id.clone().unwrap().to_string(),
        name: "Happy Hour".to_string(),
        description: None,
        scope: tably_server::db::models::DealScope::Global,
        target: None,
        adjustment_type: tably_server::db::models::AdjustmentType::Percentage,
        adjustment_value: "10".parse().unwrap(),
        window: None,
        valid_from: None,
        valid_until: None,
        is_stackable: Some(false),
        priority: Some(1),
    })
    .await
    .expect("deal");
}

#[tokio::test]
async fn storefront_menu_and_quote() {
    let (state, _tmp) = test_state().await;
    let (restaurant, dish_id) = seed_simple_menu(&state, "el-rancho").await;
    seed_global_deal(&state, &restaurant).await;
    let app = router(&state);

    // Menu is public
    let (status, menus) = request(&app, "GET", "/api/storefront/el-rancho/menu", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menus.as_array().unwrap().len(), 1);
    assert_eq!(menus[0]["orderable_now"], json!(true));
    assert_eq!(menus[0]["courses"][0]["dishes"][0]["name"], json!("Paella"));

    // Quote applies the 10% deal: 2 × 14.50 = 29.00 → 2.90 off
    let (status, quote) = request(
        &app,
        "POST",
        "/api/storefront/el-rancho/quote",
        None,
        Some(json!({ "lines": [{ "dish_id": dish_id, "quantity": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["subtotal"], json!("26.10"));
    assert_eq!(quote["discount_total"], json!("2.90"));
    assert_eq!(quote["total"], json!("26.10"));
    assert_eq!(quote["lines"][0]["applied_deals"][0], json!("Happy Hour"));

    // Unknown slug is a 404
    let (status, _) = request(&app, "GET", "/api/storefront/nope/menu", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_placement_redeems_coupon() {
    let (state, _tmp) = test_state().await;
    let (restaurant, dish_id) = seed_simple_menu(&state, "bistro").await;
    let restaurant_id = restaurant.id.clone().unwrap();

    let coupon_repo = CouponRepository::new(state.get_db());
    let coupon = coupon_repo
        .create(CouponCreate {
            restaurant_id: restaurant_id.to_string(),
            code: "welcome".to_string(),
            adjustment_type: tably_server::db::models::AdjustmentType::FixedAmount,
            adjustment_value: "5.00".parse().unwrap(),
            min_subtotal: None,
            max_redemptions: Some(1),
            valid_from: None,
            valid_until: None,
        })
        .await
        .expect("coupon");
    assert_eq!(coupon.code, "WELCOME", "codes are stored uppercase");

    let app = router(&state);

    let (status, order) = request(
        &app,
        "POST",
        "/api/storefront/bistro/orders",
        None,
        Some(json!({
            "lines": [{ "dish_id": dish_id, "quantity": 1 }],
            "coupon_code": "welcome",
            "customer_name": "Ana"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "order failed: {order}");
    assert_eq!(order["status"], json!("placed"));
    assert_eq!(order["coupon_discount"], json!("5.00"));
    assert_eq!(order["total"], json!("9.50"));

    // The redemption counter moved, so a second use fails
    let (status, body) = request(
        &app,
        "POST",
        "/api/storefront/bistro/orders",
        None,
        Some(json!({
            "lines": [{ "dish_id": dish_id, "quantity": 1 }],
            "coupon_code": "WELCOME"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
}

#[tokio::test]
async fn order_rejects_stale_expected_total() {
    let (state, _tmp) = test_state().await;
    let (_restaurant, dish_id) = seed_simple_menu(&state, "cantina").await;
    let app = router(&state);

    let (status, body) = request(
        &app,
        "POST",
        "/api/storefront/cantina/orders",
        None,
        Some(json!({
            "lines": [{ "dish_id": dish_id, "quantity": 1 }],
            "expected_total": "9.99"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "body: {body}");
}

#[tokio::test]
async fn order_status_lifecycle_via_admin() {
    let (state, _tmp) = test_state().await;
    let (restaurant, dish_id) = seed_simple_menu(&state, "trattoria").await;
    let restaurant_id = restaurant.id.clone().unwrap().to_string();
    let app = router(&state);
    let token = admin_token(&state);

    let (status, order) = request(
        &app,
        "POST",
        "/api/storefront/trattoria/orders",
        None,
        Some(json!({ "lines": [{ "dish_id": dish_id, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = order["id"].as_str().unwrap().to_string();

    // Admin sees the placed order
    let (status, orders) = request(
        &app,
        "GET",
        &format!("/api/orders?restaurant_id={restaurant_id}&status=placed"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // placed → accepted is legal
    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        Some(&token),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {updated}");
    assert_eq!(updated["status"], json!("accepted"));

    // accepted → completed skips states and is rejected
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}/status"),
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
}

#[tokio::test]
async fn admin_routes_require_token() {
    let (state, _tmp) = test_state().await;
    let app = router(&state);

    let (status, _) = request(&app, "GET", "/api/restaurants", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays public
    let (status, body) = request(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn sync_versions_move_on_mutation() {
    let (state, _tmp) = test_state().await;
    let app = router(&state);
    let token = admin_token(&state);

    let (_, before) = request(&app, "GET", "/api/sync/versions", Some(&token), None).await;
    assert!(before["versions"].get("restaurant").is_none());

    let (status, _) = request(
        &app,
        "POST",
        "/api/restaurants",
        Some(&token),
        Some(json!({ "name": "Nuevo", "slug": "nuevo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = request(&app, "GET", "/api/sync/versions", Some(&token), None).await;
    assert_eq!(after["versions"]["restaurant"], json!(1));
}
