use axum::{
    Json,
    extract::{Extension, State},
};

use crate::{
    AppState,
    auth::{Claims, ProviderCredential},
    error::AppError,
    routes::{ApiResponse, EmptyResponse},
    utils::success_to_api_response,
};

use super::model::{
    AccountLoginRequest, CheckTokenResponse, LoginResponse, LogoutRequest, PhoneLoginRequest,
    RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, RegisterResponse,
    SendCaptchaRequest, WechatLoginRequest,
};

/// 账号密码注册，成功后需另行登录
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisterResponse>>, AppError> {
    req.validate()?;

    let user_id = state
        .auth
        .register_password(&req.account, &req.password, &req.confirm_password)
        .await?;

    Ok(success_to_api_response(RegisterResponse { user_id }))
}

#[axum::debug_handler]
pub async fn login_account(
    State(state): State<AppState>,
    Json(req): Json<AccountLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let credential = ProviderCredential::Password {
        account: req.account,
        password: req.password,
    };
    let (user, token_pair) = state.auth.login_or_register(credential, req.platform).await?;

    Ok(success_to_api_response(LoginResponse {
        user_id: user.user_id,
        token_pair,
    }))
}

/// 手机号登录，首次登录自动注册
#[axum::debug_handler]
pub async fn login_phone(
    State(state): State<AppState>,
    Json(req): Json<PhoneLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    req.validate()?;

    let credential = ProviderCredential::Phone {
        phone: req.phone,
        code: req.code,
    };
    let (user, token_pair) = state.auth.login_or_register(credential, req.platform).await?;

    Ok(success_to_api_response(LoginResponse {
        user_id: user.user_id,
        token_pair,
    }))
}

/// 微信小程序登录，首次登录自动注册
#[axum::debug_handler]
pub async fn login_wechat(
    State(state): State<AppState>,
    Json(req): Json<WechatLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    req.validate()?;

    let credential = ProviderCredential::Wechat { code: req.code };
    let (user, token_pair) = state.auth.login_or_register(credential, req.platform).await?;

    Ok(success_to_api_response(LoginResponse {
        user_id: user.user_id,
        token_pair,
    }))
}

#[axum::debug_handler]
pub async fn send_captcha(
    State(state): State<AppState>,
    Json(req): Json<SendCaptchaRequest>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    req.validate()?;

    state.auth.issue_captcha(&req.phone).await?;

    Ok(success_to_api_response(EmptyResponse {}))
}

#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<RefreshTokenResponse>>, AppError> {
    let token_pair = state.auth.refresh_token(&req.refresh_token).await?;

    Ok(success_to_api_response(RefreshTokenResponse { token_pair }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<ApiResponse<EmptyResponse>>, AppError> {
    state.auth.logout(&req.refresh_token).await?;

    Ok(success_to_api_response(EmptyResponse {}))
}

/// 中间件已校验过访问令牌，这里直接回显用户ID
#[axum::debug_handler]
pub async fn check_token(
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<CheckTokenResponse>>, AppError> {
    Ok(success_to_api_response(CheckTokenResponse {
        user_id: claims.user_id,
    }))
}
