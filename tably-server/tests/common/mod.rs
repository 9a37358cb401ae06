//! Shared test harness: embedded database in a tempdir, assembled
//! router, and helpers to drive it without a network listener.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tably_server::core::{Config, ServerState, build_router};
use tably_server::db::models::{
    CourseCreate, DishCreate, MenuCreate, Restaurant, RestaurantCreate,
};
use tably_server::db::repository::{
    CourseRepository, DishRepository, MenuRepository, RestaurantRepository,
};

/// Fresh server state over a RocksDB instance in a tempdir
pub async fn test_state() -> (ServerState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await;
    (state, tmp)
}

/// Mint an admin token directly (same JwtService the router validates with)
pub fn admin_token(state: &ServerState) -> String {
    state
        .jwt_service
        .generate_token(
            "admin_user:test",
            "admin",
            "Administrator",
            "role:admin",
            "admin",
            &["all".to_string()],
            &[],
        )
        .expect("token")
}

/// Drive one request through the router and parse the JSON response
pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Router wired to the given state
pub fn router(state: &ServerState) -> Router {
    build_router(state.clone())
}

/// Seed a restaurant with one menu, one course and one dish; returns
/// (restaurant, dish id)
pub async fn seed_simple_menu(state: &ServerState, slug: &str) -> (Restaurant, String) {
    let restaurant_repo = RestaurantRepository::new(state.get_db());
    let restaurant = restaurant_repo
        .create(RestaurantCreate {
            name: format!("Test {slug}"),
            slug: slug.to_string(),
            description: None,
            timezone: Some("UTC".to_string()),
            currency: None,
            contact_email: None,
            contact_phone: None,
            franchise_code: None,
        })
        .await
        .expect("restaurant");
    let restaurant_id = restaurant.id.clone().expect("restaurant id").to_string();

    let menu_repo = MenuRepository::new(state.get_db());
    let menu = menu_repo
        .create(MenuCreate {
            restaurant_id: restaurant_id.clone(),
            name: "All Day".to_string(),
            description: None,
            schedule_id: None,
            sort_order: None,
        })
        .await
        .expect("menu");

    let course_repo = CourseRepository::new(state.get_db());
    let course = course_repo
        .create(CourseCreate {
            menu_id: menu.id.clone().expect("menu id").to_string(),
            name: "Mains".to_string(),
            description: None,
            sort_order: None,
        })
        .await
        .expect("course");

    let dish_repo = DishRepository::new(state.get_db());
    let dish = dish_repo
        .create(DishCreate {
            course_id: course.id.clone().expect("course id").to_string(),
            name: "Paella".to_string(),
            description: None,
            price: "14.50".parse().expect("price"),
            image: None,
            modifier_groups: vec![],
            dietary_tags: vec![],
            sort_order: None,
        })
        .await
        .expect("dish");

    (restaurant, dish.id.expect("dish id").to_string())
}
