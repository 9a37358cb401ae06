//! Admin User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{AdminUser, AdminUserCreate, AdminUserUpdate};
use crate::db::repository::{AdminUserRepository, RoleRepository};
use crate::utils::validation::{MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "admin_user";

/// Minimum password length for operator accounts
const MIN_PASSWORD_LEN: usize = 8;

fn check_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password is too long"));
    }
    Ok(())
}

/// GET /api/admins - 获取所有操作员账号
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<AdminUser>>> {
    let repo = AdminUserRepository::new(state.get_db());
    let users = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(users))
}

/// GET /api/admins/:id - 获取单个操作员账号
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AdminUser>> {
    let repo = AdminUserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Admin user {} not found", id)))?;
    Ok(Json(user))
}

/// POST /api/admins - 创建操作员账号
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AdminUserCreate>,
) -> AppResult<Json<AdminUser>> {
    validate_required_text(&payload.username, "username", MAX_NAME_LEN)?;
    check_password(&payload.password)?;

    // Role must exist before the account points at it
    let role_repo = RoleRepository::new(state.get_db());
    role_repo
        .find_by_id(&payload.role_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::validation(format!("Role {} not found", payload.role_id)))?;

    let repo = AdminUserRepository::new(state.get_db());
    let user = repo
        .create(payload)
        .await
        .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(user))
}

/// PUT /api/admins/:id - 更新操作员账号
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUserUpdate>,
) -> AppResult<Json<AdminUser>> {
    if let Some(ref password) = payload.password {
        check_password(password)?;
    }
    if let Some(ref role_id) = payload.role_id {
        let role_repo = RoleRepository::new(state.get_db());
        role_repo
            .find_by_id(role_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::validation(format!("Role {} not found", role_id)))?;
    }

    let repo = AdminUserRepository::new(state.get_db());
    let user = repo.update(&id, payload).await.map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    Ok(Json(user))
}

/// DELETE /api/admins/:id - 删除操作员账号
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = AdminUserRepository::new(state.get_db());
    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}
