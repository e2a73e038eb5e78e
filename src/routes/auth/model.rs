use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::error::AppError;
use crate::models::enums::Platform;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub account: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_account(&self.account) {
            return Err(AppError::Validation(
                "账号长度4到32位，只允许使用字母、数字和下划线",
            ));
        }
        if self.password.len() < 6 || self.password.len() > 24 {
            return Err(AppError::Validation("密码长度必须在6到24个字符之间"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountLoginRequest {
    pub account: String,
    pub password: String,
    pub platform: Platform,
}

#[derive(Debug, Deserialize)]
pub struct PhoneLoginRequest {
    pub phone: String,
    pub code: String,
    pub platform: Platform,
}

impl PhoneLoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_phone(&self.phone) {
            return Err(AppError::Validation("手机号格式无效"));
        }
        if self.code.len() != 6 || !self.code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("验证码必须是6位数字"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct WechatLoginRequest {
    pub code: String,
    pub platform: Platform,
}

impl WechatLoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.code.is_empty() {
            return Err(AppError::Validation("微信登录凭证不能为空"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SendCaptchaRequest {
    pub phone: String,
}

impl SendCaptchaRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_valid_phone(&self.phone) {
            return Err(AppError::Validation("手机号格式无效"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// 登录成功响应，携带用户ID与完整令牌对
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub token_pair: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    #[serde(flatten)]
    pub token_pair: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct CheckTokenResponse {
    pub user_id: String,
}

fn is_valid_account(account: &str) -> bool {
    (4..=32).contains(&account.len())
        && account.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 11位国内手机号，1开头
fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11
        && phone.starts_with('1')
        && phone.chars().all(|c| c.is_ascii_digit())
}
