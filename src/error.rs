use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 统一的应用错误类型。
///
/// 业务错误携带固定的用户可见文案，HTTP 状态码保持 200，由 code 区分；
/// 系统错误只返回笼统提示，细节仅记录在日志中。
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// 账号不存在或密码错误，两种情况文案一致，避免账号枚举
    InvalidCredentials,
    /// 验证码缺失、过期或不匹配，统一提示
    CaptchaInvalid,
    /// (身份类型, 标识符) 已被注册
    IdentityExists,
    /// 注册时密码与确认密码不一致
    PasswordMismatch,
    /// 用户状态非活跃，禁止登录和刷新
    UserInactive,
    /// 刷新令牌签名、过期或签发者校验失败
    InvalidRefreshToken,
    /// 刷新令牌的 JTI 已进入黑名单
    RefreshTokenRevoked,
    /// 请求参数校验失败
    Validation(&'static str),
    /// 按主键查找的用户不存在（管理操作）
    UserNotFound,
    /// 身份记录不存在或不属于当前用户
    IdentityNotFound,
    /// 缺少或无法解析访问令牌
    Unauthorized,
    /// 角色不满足接口要求
    PermissionDenied,
    /// 微信 code 换取 openid 失败
    WechatExchangeFailed,
    /// 身份记录存在但用户行缺失，数据已损坏
    DataCorruption,
    /// 存储层不可用等瞬时错误
    System,
}

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            AppError::InvalidCredentials => error_codes::AUTH_FAILED,
            AppError::CaptchaInvalid => error_codes::AUTH_FAILED,
            AppError::IdentityExists => error_codes::USER_EXISTS,
            AppError::PasswordMismatch => error_codes::VALIDATION_ERROR,
            AppError::UserInactive => error_codes::AUTH_FAILED,
            AppError::InvalidRefreshToken => error_codes::AUTH_FAILED,
            AppError::RefreshTokenRevoked => error_codes::AUTH_FAILED,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::UserNotFound => error_codes::NOT_FOUND,
            AppError::IdentityNotFound => error_codes::NOT_FOUND,
            AppError::Unauthorized => error_codes::AUTH_FAILED,
            AppError::PermissionDenied => error_codes::PERMISSION_DENIED,
            AppError::WechatExchangeFailed => error_codes::AUTH_FAILED,
            AppError::DataCorruption => error_codes::INTERNAL_ERROR,
            AppError::System => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "账号不存在或密码错误",
            AppError::CaptchaInvalid => "验证码错误或已过期",
            AppError::IdentityExists => "该账号已被注册，请直接登录",
            AppError::PasswordMismatch => "密码和确认密码不一致，请检查输入",
            AppError::UserInactive => "用户状态异常，无法登录",
            AppError::InvalidRefreshToken => "无效的刷新令牌",
            AppError::RefreshTokenRevoked => "刷新令牌已失效",
            AppError::Validation(msg) => msg,
            AppError::UserNotFound => "用户不存在",
            AppError::IdentityNotFound => "身份记录不存在",
            AppError::Unauthorized => "未授权访问",
            AppError::PermissionDenied => "权限不足",
            AppError::WechatExchangeFailed => "微信登录凭证校验失败，请稍后重试",
            AppError::DataCorruption => "系统繁忙，请稍后重试",
            AppError::System => "系统繁忙，请稍后重试",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::DataCorruption | AppError::System => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = error_to_api_response::<()>(self.code(), self.message().to_string());

        (self.status(), body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("数据库操作失败: {:?}", err);
        AppError::System
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("Redis 操作失败: {:?}", err);
        AppError::System
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("密码哈希操作失败: {:?}", err);
        AppError::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_keep_http_200() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::OK);
        assert_eq!(AppError::CaptchaInvalid.status(), StatusCode::OK);
        assert_eq!(AppError::IdentityExists.status(), StatusCode::OK);
    }

    #[test]
    fn missing_account_and_wrong_password_share_one_message() {
        // 文案一致，客户端无法区分账号是否存在
        assert_eq!(
            AppError::InvalidCredentials.message(),
            "账号不存在或密码错误"
        );
    }

    #[test]
    fn system_errors_hide_details() {
        assert_eq!(AppError::System.message(), AppError::DataCorruption.message());
        assert_eq!(AppError::System.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
