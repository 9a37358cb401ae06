//! Tably Server - 餐厅在线点单平台服务端
//!
//! # 架构概述
//!
//! 本模块是平台节点的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (models + repositories)
//! - **认证** (`auth`): JWT + Argon2 认证体系，管理端 RBAC 与设备会话
//! - **定价** (`pricing`): 购物车报价 (优惠活动匹配、优惠码)
//! - **服务** (`services`): 菜单装配、域名验证、经营分析
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! tably-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限、设备会话
//! ├── db/            # 数据库层 (models + repositories)
//! ├── pricing/       # 报价引擎
//! ├── services/      # 菜单装配、域名验证、分析
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod pricing;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentDevice, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境：加载 .env、初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(None, log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  ______      __    __
 /_  __/___ _/ /_  / /_  __
  / / / __ `/ __ \/ / / / /
 / / / /_/ / /_/ / / /_/ /
/_/  \__,_/_.___/_/\__, /
                  /____/
    "#
    );
}
