use thiserror::Error;

/// 服务器启动/运行阶段错误
///
/// 请求处理阶段的错误使用 [`crate::utils::AppError`]。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// 启动阶段的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
