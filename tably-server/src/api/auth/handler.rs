//! Authentication Handlers
//!
//! Handles dashboard login, logout, and current-user lookup.

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Role;
use crate::db::repository::{AdminUserRepository, RoleRepository};
use crate::security_log;

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates operator credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = AdminUserRepository::new(state.get_db());
    let username = req.username.clone();

    let user = repo
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::database(format!("Query failed: {}", e)))?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let user = match user {
        Some(u) => {
            if !u.is_active {
                return Err(AppError::forbidden("Account has been disabled"));
            }

            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                security_log!("WARN", "login_failed", username = username.clone());
                tracing::warn!(username = %username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            security_log!("WARN", "login_failed", username = username.clone());
            tracing::warn!(username = %username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Fetch role information
    let role_repo = RoleRepository::new(state.get_db());
    let role: Role = role_repo
        .find_by_id(&user.role.to_string())
        .await
        .map_err(|e| AppError::database(format!("Failed to query role: {}", e)))?
        .ok_or_else(|| AppError::internal("Role not found"))?;

    if !role.is_active {
        return Err(AppError::forbidden("Role has been disabled"));
    }

    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let restaurants: Vec<String> = user.restaurants.iter().map(|r| r.to_string()).collect();

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(
            &user_id,
            &user.username,
            &user.display_name,
            &user.role.to_string(),
            &role.name,
            &role.permissions,
            &restaurants,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = %user_id,
        username = %user.username,
        role = %role.name,
        "User logged in successfully"
    );

    let response = LoginResponse {
        token,
        user: UserInfo {
            id: user_id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role_id: user.role.to_string(),
            role_name: role.name,
            permissions: role.permissions,
            restaurants,
            is_system: user.is_system,
            is_active: user.is_active,
            created_at: user.created_at,
        },
    };

    Ok(Json(response))
}

/// Get current user info
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserInfo>, AppError> {
    // Query fresh data for is_active and created_at
    let repo = AdminUserRepository::new(state.get_db());
    let fresh = repo
        .find_by_id(&user.id)
        .await
        .map_err(|e| AppError::database(format!("Failed to query user: {}", e)))?;

    let (is_system, is_active, created_at) = fresh
        .map(|u| (u.is_system, u.is_active, u.created_at))
        .unwrap_or((false, true, 0));

    Ok(Json(UserInfo {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        role_id: user.role_id,
        role_name: user.role_name,
        permissions: user.permissions,
        restaurants: user.restaurants,
        is_system,
        is_active,
        created_at,
    }))
}

/// Logout handler
///
/// JWTs are stateless; logout exists for the audit trail.
pub async fn logout(Extension(user): Extension<CurrentUser>) -> Result<Json<()>, AppError> {
    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User logged out"
    );

    Ok(Json(()))
}
