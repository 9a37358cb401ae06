use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::{AdminUser, Role, RoleCreate};
use crate::db::repository::{AdminUserRepository, RoleRepository};
use crate::utils::time::now_millis;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// # 使用场景
///
/// 每次资源变更时递增版本号；dashboard 和平板客户端轮询
/// `GET /api/sync/versions`，版本号变化时才重新拉取集合。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    /// 创建空的版本管理器
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }

    /// 所有资源的版本号快照
    pub fn snapshot(&self) -> std::collections::HashMap<String, u64> {
        self.versions
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是平台节点的核心数据结构，使用 Arc 实现浅拷贝。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 资源版本管理器
    pub resource_versions: Arc<ResourceVersions>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        resource_versions: Arc<ResourceVersions>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            resource_versions,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database)
    /// 3. JWT 服务
    /// 4. 种子数据 (内置 admin 角色和根管理员账号)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_dir = config.database_dir();
        let db_path_str = db_dir.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());

        let state = Self::new(config.clone(), db, jwt_service, resource_versions);

        state
            .seed_builtin_accounts()
            .await
            .expect("Failed to seed built-in accounts");

        state
    }

    /// 种子数据：内置 admin 角色 + 根管理员账号
    ///
    /// 仅在首次启动（表为空）时写入。初始密码从
    /// `ADMIN_INITIAL_PASSWORD` 读取，未设置时生成随机密码并打印一次。
    async fn seed_builtin_accounts(&self) -> Result<(), crate::utils::AppError> {
        use crate::utils::AppError;

        let role_repo = RoleRepository::new(self.db.clone());
        let admin_role = match role_repo
            .find_by_name("admin")
            .await
            .map_err(|e| AppError::database(e.to_string()))?
        {
            Some(role) => role,
            None => {
                let created = role_repo
                    .create(RoleCreate {
                        name: "admin".to_string(),
                        permissions: vec!["all".to_string()],
                    })
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;
                // Mark as system role so it cannot be deleted
                self.db
                    .query("UPDATE $thing SET is_system = true")
                    .bind(("thing", created.id.clone().expect("created role has id")))
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;
                tracing::info!("Seeded built-in 'admin' role");
                Role {
                    is_system: true,
                    ..created
                }
            }
        };

        let user_repo = AdminUserRepository::new(self.db.clone());
        let existing = user_repo
            .find_by_username("admin")
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if existing.is_none() {
            let password = std::env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| {
                let generated = crate::auth::jwt::generate_printable_jwt_secret()[..16].to_string();
                tracing::warn!(
                    "ADMIN_INITIAL_PASSWORD not set - generated root password: {}",
                    generated
                );
                generated
            });

            let hash_pass = AdminUser::hash_password(&password)
                .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

            // hash_pass is skip_serializing on the model; write the row
            // with an explicit CREATE
            self.db
                .query(
                    "CREATE admin_user SET
                        username = 'admin',
                        display_name = 'Administrator',
                        hash_pass = $hash_pass,
                        role = $role,
                        restaurants = [],
                        is_system = true,
                        is_active = true,
                        created_at = $created_at",
                )
                .bind(("hash_pass", hash_pass))
                .bind(("role", admin_role.id.clone().expect("admin role has id")))
                .bind(("created_at", now_millis()))
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            tracing::info!("Seeded root admin account 'admin'");
        }

        Ok(())
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 记录资源变更
    ///
    /// 递增资源版本号，供客户端通过 `/api/sync/versions` 感知变化。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "menu", "dish", "order")
    pub fn bump_version(&self, resource: &str) {
        let version = self.resource_versions.increment(resource);
        tracing::debug!(resource = %resource, version = version, "Resource version bumped");
    }
}
