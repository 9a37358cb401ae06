//! Tablet device authentication flow: registration, login with the
//! issued key, heartbeat, session revocation and token-type isolation.

mod common;

use http::StatusCode;
use serde_json::json;

use common::{admin_token, request, router, seed_simple_menu, test_state};

#[tokio::test]
async fn device_login_heartbeat_and_revocation() {
    let (state, _tmp) = test_state().await;
    let (restaurant, _dish_id) = seed_simple_menu(&state, "kitchen-test").await;
    let restaurant_id = restaurant.id.clone().unwrap().to_string();
    let app = router(&state);
    let token = admin_token(&state);

    // Register a device; the plaintext key appears exactly once
    let (status, registered) = request(
        &app,
        "POST",
        "/api/devices",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant_id,
            "name": "Kitchen 1",
            "kind": "kitchen"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {registered}");
    let device_id = registered["device"]["id"].as_str().unwrap().to_string();
    let device_key = registered["device_key"].as_str().unwrap().to_string();
    assert!(!device_key.is_empty());

    // Wrong key is rejected with the unified message
    let (status, _) = request(
        &app,
        "POST",
        "/api/device/login",
        None,
        Some(json!({ "device_id": device_id, "device_key": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Right key yields a device token
    let (status, login) = request(
        &app,
        "POST",
        "/api/device/login",
        None,
        Some(json!({ "device_id": device_id, "device_key": device_key })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {login}");
    let device_token = login["token"].as_str().unwrap().to_string();
    assert!(login["expires_in"].as_i64().unwrap() > 0);

    // Heartbeat updates status and last_seen_at
    let (status, beat) = request(
        &app,
        "POST",
        "/api/device/heartbeat",
        Some(&device_token),
        Some(json!({ "status": "busy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {beat}");
    assert_eq!(beat["status"], json!("busy"));
    assert!(beat["last_seen_at"].as_i64().unwrap() > 0);

    // A device token does not open admin routes
    let (status, _) = request(&app, "GET", "/api/restaurants", Some(&device_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Revoke all sessions from the dashboard
    let (status, revoked) = request(
        &app,
        "POST",
        &format!("/api/devices/{device_id}/revoke"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revoked["revoked_sessions"], json!(1));

    // The outstanding token is now dead even though its signature is valid
    let (status, _) = request(
        &app,
        "POST",
        "/api/device/heartbeat",
        Some(&device_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn device_token_refresh_rotates_session() {
    let (state, _tmp) = test_state().await;
    let (restaurant, _dish) = seed_simple_menu(&state, "rotation-test").await;
    let restaurant_id = restaurant.id.clone().unwrap().to_string();
    let app = router(&state);
    let token = admin_token(&state);

    let (_, registered) = request(
        &app,
        "POST",
        "/api/devices",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant_id,
            "name": "Pass",
            "kind": "front_of_house"
        })),
    )
    .await;
    let device_id = registered["device"]["id"].as_str().unwrap().to_string();
    let device_key = registered["device_key"].as_str().unwrap().to_string();

    let (_, login) = request(
        &app,
        "POST",
        "/api/device/login",
        None,
        Some(json!({ "device_id": device_id, "device_key": device_key })),
    )
    .await;
    let old_token = login["token"].as_str().unwrap().to_string();

    let (status, refreshed) = request(
        &app,
        "POST",
        "/api/device/refresh",
        Some(&old_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {refreshed}");
    let new_token = refreshed["token"].as_str().unwrap().to_string();
    assert_ne!(old_token, new_token);

    // The old session was revoked by the rotation
    let (status, _) = request(
        &app,
        "POST",
        "/api/device/heartbeat",
        Some(&old_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The new one works
    let (status, _) = request(
        &app,
        "POST",
        "/api/device/heartbeat",
        Some(&new_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn device_sees_only_active_orders_of_its_restaurant() {
    let (state, _tmp) = test_state().await;
    let (restaurant, dish_id) = seed_simple_menu(&state, "queue-test").await;
    let restaurant_id = restaurant.id.clone().unwrap().to_string();
    // A second restaurant whose orders must stay invisible
    let (_other, other_dish) = seed_simple_menu(&state, "other-rest").await;
    let app = router(&state);
    let token = admin_token(&state);

    let (_, registered) = request(
        &app,
        "POST",
        "/api/devices",
        Some(&token),
        Some(json!({
            "restaurant_id": restaurant_id,
            "name": "Kitchen",
            "kind": "kitchen"
        })),
    )
    .await;
    let device_id = registered["device"]["id"].as_str().unwrap().to_string();
    let device_key = registered["device_key"].as_str().unwrap().to_string();
    let (_, login) = request(
        &app,
        "POST",
        "/api/device/login",
        None,
        Some(json!({ "device_id": device_id, "device_key": device_key })),
    )
    .await;
    let device_token = login["token"].as_str().unwrap().to_string();

    // One order in each restaurant
    let (status, order) = request(
        &app,
        "POST",
        "/api/storefront/queue-test/orders",
        None,
        Some(json!({ "lines": [{ "dish_id": dish_id, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &app,
        "POST",
        "/api/storefront/other-rest/orders",
        None,
        Some(json!({ "lines": [{ "dish_id": other_dish, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The work queue shows only this restaurant's order
    let (status, queue) = request(&app, "GET", "/api/device/orders", Some(&device_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);

    // The tablet advances it
    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/api/device/orders/{order_id}/status"),
        Some(&device_token),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {updated}");
    assert_eq!(updated["status"], json!("accepted"));
}
