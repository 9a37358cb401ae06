//! 业务服务层
//!
//! 菜单装配、购物车解析、域名验证、经营分析。原平台将这些逻辑放在
//! 远程存储过程和 edge function 里；这里作为进程内服务实现，
//! handler 只做参数校验和错误映射。

pub mod analytics;
pub mod domain_verification;
pub mod menu_service;

pub use analytics::{AnalyticsService, FranchiseSummary, RestaurantSummary};
pub use domain_verification::{DomainVerifier, WELL_KNOWN_PATH, generate_token, normalize_hostname};
pub use menu_service::{MenuIndex, MenuService, StorefrontMenu, resolve_cart, schedule_is_open};
