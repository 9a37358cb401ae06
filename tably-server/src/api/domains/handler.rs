//! Custom Domain API Handlers
//!
//! Registration issues a verification token; verification fetches the
//! well-known file from the claimed host and records the outcome.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::ensure_can_manage;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Domain, DomainCreate, DomainStatus};
use crate::db::repository::{DomainRepository, RestaurantRepository, rid};
use crate::services::domain_verification::{self, DomainVerifier};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "domain";

/// GET /api/restaurants/:id/domains - 获取餐厅的自定义域名
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<String>,
) -> AppResult<Json<Vec<Domain>>> {
    ensure_can_manage(&user, &rid("restaurant", &restaurant_id))?;

    let repo = DomainRepository::new(state.get_db());
    let domains = repo
        .find_by_restaurant(&restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(domains))
}

/// POST /api/restaurants/:id/domains - 注册自定义域名
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<String>,
    Json(payload): Json<DomainCreate>,
) -> AppResult<Json<Domain>> {
    let restaurant = rid("restaurant", &restaurant_id);
    ensure_can_manage(&user, &restaurant)?;

    let restaurant_repo = RestaurantRepository::new(state.get_db());
    restaurant_repo
        .find_by_id(&restaurant_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", restaurant_id)))?;

    let hostname = domain_verification::normalize_hostname(
        &payload.hostname,
        &state.config.platform_base_domain,
    )?;
    let token = domain_verification::generate_token()?;

    let repo = DomainRepository::new(state.get_db());
    let domain = repo
        .create(restaurant, hostname, token)
        .await
        .map_err(AppError::from)?;

    state.bump_version(RESOURCE);

    tracing::info!(
        hostname = %domain.hostname,
        restaurant = %restaurant_id,
        "Custom domain registered, verification pending"
    );

    Ok(Json(domain))
}

/// POST /api/domains/:id/verify - 验证域名
///
/// 拉取 `http://<hostname>/.well-known/tably-verification.txt` 并与
/// 存储的 token 比对。任何来源的失败都会记录到 last_error。
pub async fn verify(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Domain>> {
    let repo = DomainRepository::new(state.get_db());
    let domain = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Domain {} not found", id)))?;
    ensure_can_manage(&user, &domain.restaurant)?;

    let expected = domain
        .verification_token
        .clone()
        .ok_or_else(|| AppError::internal("Domain row has no verification token"))?;

    let verifier = DomainVerifier::new();
    let outcome = match verifier.fetch_token(&domain.hostname).await {
        Ok(body) if body == expected => Ok(()),
        Ok(_) => Err("Token mismatch".to_string()),
        Err(e) => Err(e),
    };

    let updated = match outcome {
        Ok(()) => {
            tracing::info!(hostname = %domain.hostname, "Domain verified");
            repo.set_verification_result(&id, DomainStatus::Verified, None)
                .await
                .map_err(AppError::from)?
        }
        Err(reason) => {
            tracing::warn!(hostname = %domain.hostname, reason = %reason, "Domain verification failed");
            repo.set_verification_result(&id, DomainStatus::Failed, Some(reason))
                .await
                .map_err(AppError::from)?
        }
    };

    state.bump_version(RESOURCE);

    Ok(Json(updated))
}

/// DELETE /api/domains/:id - 删除域名
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DomainRepository::new(state.get_db());
    let existing = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Domain {} not found", id)))?;
    ensure_can_manage(&user, &existing.restaurant)?;

    let result = repo.delete(&id).await.map_err(AppError::from)?;

    if result {
        state.bump_version(RESOURCE);
    }

    Ok(Json(result))
}
