//! Database Models
//!
//! One model per aggregate plus its Create/Update DTOs. Record ids use
//! the `table:id` string convention on the wire; [`serde_helpers`]
//! accepts both the string and the native SurrealDB form.

pub mod serde_helpers;

pub mod admin_user;
pub mod course;
pub mod device;
pub mod dish;
pub mod domain;
pub mod location;
pub mod menu;
pub mod modifier;
pub mod onboarding;
pub mod order;
pub mod promotion;
pub mod restaurant;
pub mod role;
pub mod schedule;

pub use admin_user::{AdminUser, AdminUserCreate, AdminUserId, AdminUserUpdate};
pub use course::{Course, CourseCreate, CourseUpdate};
pub use device::{Device, DeviceCreate, DeviceKind, DeviceSession, DeviceUpdate};
pub use dish::{Dish, DishCreate, DishUpdate};
pub use domain::{Domain, DomainCreate, DomainStatus};
pub use location::{Location, LocationCreate, LocationUpdate};
pub use menu::{Menu, MenuCreate, MenuUpdate};
pub use modifier::{
    ModifierGroup, ModifierGroupCreate, ModifierGroupUpdate, ModifierItem, ModifierItemInput,
};
pub use onboarding::{ALL_STEPS, Onboarding, OnboardingStep, StepState, StepStatus};
pub use order::{Order, OrderLine, OrderModifier, OrderStatus, OrderStatusUpdate};
pub use promotion::{
    AdjustmentType, Coupon, CouponCreate, CouponUpdate, Deal, DealCreate, DealScope, DealUpdate,
    WeeklyWindow,
};
pub use restaurant::{Restaurant, RestaurantCreate, RestaurantId, RestaurantUpdate};
pub use role::{Role, RoleCreate, RoleId, RoleUpdate};
pub use schedule::{
    ApplyTemplateRequest, Schedule, ScheduleBlock, ScheduleCreate, ScheduleTemplate,
    ScheduleTemplateCreate, ScheduleTemplateUpdate, ScheduleUpdate,
};
