use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::{
    AppState,
    auth::Claims,
    database::operations::identity::IdentityOperation,
    database::operations::profile::ProfileOperation,
    database::operations::user::UserOperation,
    error::AppError,
    models::enums::IdentityType,
    routes::{ApiResponse, EmptyResponse},
    utils::{hash_password, success_to_api_response, verify_password},
};

use super::model::{
    AccountDetailResponse, BindIdentityRequest, IdentityResponse, ProfileResponse,
    UpdatePasswordRequest, UpdateProfileRequest,
};

/// 查看自己的资料。
/// 用户存在而资料缺失说明注册事务被绕过了，按数据损坏处理。
#[axum::debug_handler]
pub async fn get_my_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let profile = ProfileOperation::find_by_user_id(&state.pool, &claims.user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!(user_id = %claims.user_id, "用户存在但资料行缺失");
            AppError::DataCorruption
        })?;

    Ok(success_to_api_response(profile.into()))
}

#[axum::debug_handler]
pub async fn update_my_profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    req.validate()?;

    let profile = ProfileOperation::update(
        &state.pool,
        &claims.user_id,
        req.nickname.as_deref(),
        req.avatar_url.as_deref(),
        req.gender,
        req.province.as_deref(),
        req.city.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        tracing::error!(user_id = %claims.user_id, "用户存在但资料行缺失");
        AppError::DataCorruption
    })?;

    Ok(success_to_api_response(profile.into()))
}

/// 列出自己绑定的全部登录方式
#[axum::debug_handler]
pub async fn list_my_identities(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<IdentityResponse>>>, AppError> {
    let identities = IdentityOperation::list_by_user_id(&state.pool, &claims.user_id).await?;

    Ok(success_to_api_response(
        identities.into_iter().map(IdentityResponse::from).collect(),
    ))
}

/// 聚合返回核心信息、资料与全部登录方式
#[axum::debug_handler]
pub async fn get_my_account(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AccountDetailResponse>>, AppError> {
    let user = UserOperation::find_by_id(&state.pool, &claims.user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!(user_id = %claims.user_id, "令牌有效但用户行缺失");
            AppError::DataCorruption
        })?;
    let profile = ProfileOperation::find_by_user_id(&state.pool, &claims.user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!(user_id = %claims.user_id, "用户存在但资料行缺失");
            AppError::DataCorruption
        })?;
    let identities = IdentityOperation::list_by_user_id(&state.pool, &claims.user_id).await?;

    Ok(success_to_api_response(AccountDetailResponse {
        user_id: user.user_id,
        user_role: user.user_role,
        status: user.status,
        nickname: profile.nickname,
        avatar_url: profile.avatar_url,
        gender: profile.gender,
        province: profile.province,
        city: profile.city,
        created_at: user.created_at,
        updated_at: profile.updated_at,
        identities: identities.into_iter().map(IdentityResponse::from).collect(),
    }))
}

/// 绑定一种新的登录方式
#[axum::debug_handler]
pub async fn bind_identity(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<BindIdentityRequest>,
) -> Result<Json<ApiResponse<IdentityResponse>>, AppError> {
    req.validate()?;

    state
        .auth
        .bind_identity(&claims.user_id, req.identity_type, &req.identifier, &req.credential)
        .await?;

    // 回读落库行，返回不含凭证的视图
    let identity =
        IdentityOperation::find_by_type_and_identifier(&state.pool, req.identity_type, &req.identifier)
            .await?
            .ok_or_else(|| {
                tracing::error!(user_id = %claims.user_id, "刚绑定的身份行读取不到");
                AppError::System
            })?;

    Ok(success_to_api_response(identity.into()))
}

/// 解绑一种登录方式。
/// 至少保留一个身份，否则用户将永远无法再登录。
#[axum::debug_handler]
pub async fn unbind_identity(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(identity_id): Path<i64>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    let identities = IdentityOperation::list_by_user_id(&state.pool, &claims.user_id).await?;
    if !identities
        .iter()
        .any(|identity| identity.identity_id == identity_id)
    {
        return Err(AppError::IdentityNotFound);
    }
    if identities.len() <= 1 {
        return Err(AppError::Validation("不能解绑最后一种登录方式"));
    }

    if !IdentityOperation::delete(&state.pool, identity_id, &claims.user_id).await? {
        // 列表查询之后、删除之前被并发解绑
        return Err(AppError::IdentityNotFound);
    }

    tracing::info!(user_id = %claims.user_id, identity_id, "身份解绑成功");
    Ok(success_to_api_response(EmptyResponse {}))
}

/// 修改账号密码，需先校验旧密码
#[axum::debug_handler]
pub async fn update_my_password(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    req.validate()?;

    let identities = IdentityOperation::list_by_user_id(&state.pool, &claims.user_id).await?;
    let identity = identities
        .into_iter()
        .find(|identity| identity.identity_type == IdentityType::PasswordAccount)
        .ok_or(AppError::Validation("当前用户未绑定账号密码登录方式"))?;

    if !verify_password(&req.old_password, &identity.credential)? {
        tracing::warn!(user_id = %claims.user_id, "修改密码时旧密码校验失败");
        return Err(AppError::InvalidCredentials);
    }

    let hashed = hash_password(&req.new_password)?;
    IdentityOperation::update_credential(&state.pool, identity.identity_id, &hashed).await?;

    tracing::info!(user_id = %claims.user_id, "密码修改成功");
    Ok(success_to_api_response(EmptyResponse {}))
}
