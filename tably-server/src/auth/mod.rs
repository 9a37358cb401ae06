//! 认证授权模块
//!
//! 提供 JWT 认证、权限管理和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] / [`CurrentDevice`] - 请求上下文
//! - [`require_auth`] - 管理端认证中间件
//! - [`require_permission`] / [`require_admin`] - 授权中间件
//! - [`require_device`] - 设备认证中间件

pub mod device;
pub mod jwt;
pub mod middleware;

pub use device::{generate_device_key, require_device};
pub use jwt::{Claims, CurrentDevice, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_permission};
