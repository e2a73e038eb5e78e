use axum::{
    Json,
    extract::{Extension, Query, State},
};

use crate::{
    AppState,
    auth::Claims,
    database::operations::join_query::UserQueryOperation,
    database::operations::user::UserOperation,
    error::AppError,
    models::enums::UserRole,
    routes::{ApiResponse, EmptyResponse},
    utils::success_to_api_response,
};

use super::model::{
    DeleteUserRequest, ListUsersQuery, UpdateUserStatusRequest, UserListItem, UserListResponse,
    UserStatusResponse,
};

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if claims.role != UserRole::Admin {
        tracing::warn!(user_id = %claims.user_id, "非管理员访问管理接口");
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

/// 分页查询用户列表，联表带出资料摘要
#[axum::debug_handler]
pub async fn list_users(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<UserListResponse>>, AppError> {
    require_admin(&claims)?;

    let total =
        UserQueryOperation::count(&state.pool, query.status, query.nickname.as_deref()).await?;
    let rows = UserQueryOperation::list_with_profiles(
        &state.pool,
        query.status,
        query.nickname.as_deref(),
        i64::from(query.page_size()),
        query.offset(),
    )
    .await?;

    Ok(success_to_api_response(UserListResponse {
        total,
        page: query.page(),
        page_size: query.page_size(),
        users: rows.into_iter().map(UserListItem::from).collect(),
    }))
}

/// 拉黑或恢复用户。
/// 状态写入后，存量访问令牌仍然有效，直到下一次刷新被闸门拦下。
#[axum::debug_handler]
pub async fn update_user_status(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse<UserStatusResponse>>, AppError> {
    require_admin(&claims)?;

    let user = UserOperation::update_status(&state.pool, &req.user_id, req.status)
        .await?
        .ok_or(AppError::UserNotFound)?;

    tracing::info!(
        operator = %claims.user_id,
        user_id = %user.user_id,
        status = ?user.status,
        "管理员更新用户状态"
    );
    Ok(success_to_api_response(UserStatusResponse {
        user_id: user.user_id,
        user_role: user.user_role,
        status: user.status,
    }))
}

/// 软删除用户，操作后该用户无法登录和刷新令牌
#[axum::debug_handler]
pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<DeleteUserRequest>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    require_admin(&claims)?;

    if !UserOperation::soft_delete(&state.pool, &req.user_id).await? {
        return Err(AppError::UserNotFound);
    }

    tracing::info!(operator = %claims.user_id, user_id = %req.user_id, "管理员删除用户");
    Ok(success_to_api_response(EmptyResponse {}))
}
