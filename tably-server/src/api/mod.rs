//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理端认证接口
//! - [`admins`] / [`roles`] - 操作员和角色管理
//! - [`restaurants`] / [`locations`] - 租户管理
//! - [`menus`] / [`courses`] / [`dishes`] / [`modifier_groups`] - 菜单管理
//! - [`schedules`] - 排班和排班模板
//! - [`promotions`] - 优惠活动和优惠码
//! - [`onboarding`] / [`domains`] - 开店流程和自定义域名
//! - [`devices`] - 平板设备生命周期和设备面接口
//! - [`orders`] - 订单管理
//! - [`storefront`] - 顾客下单面 (公共)
//! - [`analytics`] - 经营分析
//! - [`upload`] - 图片上传
//! - [`sync`] - 资源版本轮询

pub mod auth;
pub mod health;
pub mod sync;
pub mod upload;

// Access control
pub mod admins;
pub mod roles;

// Tenancy
pub mod domains;
pub mod locations;
pub mod onboarding;
pub mod restaurants;

// Menu domain
pub mod courses;
pub mod dishes;
pub mod menus;
pub mod modifier_groups;

// Scheduling and promotions
pub mod promotions;
pub mod schedules;

// Devices and ordering
pub mod analytics;
pub mod devices;
pub mod orders;
pub mod storefront;

use crate::auth::CurrentUser;
use crate::utils::{AppError, AppResult};
use surrealdb::RecordId;

/// One entry of a batch sort-order update
#[derive(Debug, serde::Deserialize)]
pub struct SortOrderUpdate {
    pub id: String,
    pub sort_order: i32,
}

/// Response for batch reorder operations
///
/// Reordering is intentionally non-transactional (one update per row);
/// `updated` reports how many rows were actually written, and a
/// mid-batch failure surfaces as an error naming the failed id.
#[derive(Debug, serde::Serialize)]
pub struct BatchUpdateResponse {
    pub updated: usize,
}

/// Restaurant scoping check shared by every restaurant-owned resource
pub(crate) fn ensure_can_manage(user: &CurrentUser, restaurant: &RecordId) -> AppResult<()> {
    let restaurant_id = restaurant.to_string();
    if !user.can_manage(&restaurant_id) {
        return Err(AppError::forbidden(format!(
            "No access to restaurant {}",
            restaurant_id
        )));
    }
    Ok(())
}
