use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::enums::{Gender, IdentityType, UserRole, UserStatus};
use crate::models::user::{UserIdentityEntity, UserProfileEntity};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub nickname: String,
    pub avatar_url: String,
    pub gender: Gender,
    pub province: String,
    pub city: String,
}

impl From<UserProfileEntity> for ProfileResponse {
    fn from(profile: UserProfileEntity) -> Self {
        Self {
            user_id: profile.user_id,
            nickname: profile.nickname,
            avatar_url: profile.avatar_url,
            gender: profile.gender,
            province: profile.province,
            city: profile.city,
        }
    }
}

/// 资料部分更新，缺省字段保持原值
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(nickname) = &self.nickname {
            if nickname.chars().count() < 2 || nickname.chars().count() > 24 {
                return Err(AppError::Validation("昵称长度必须在2到24个字符之间"));
            }
        }
        Ok(())
    }
}

/// 身份视图，凭证不对外暴露
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub identity_id: i64,
    pub identity_type: IdentityType,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserIdentityEntity> for IdentityResponse {
    fn from(identity: UserIdentityEntity) -> Self {
        Self {
            identity_id: identity.identity_id,
            identity_type: identity.identity_type,
            identifier: identity.identifier,
            created_at: identity.created_at,
        }
    }
}

/// 绑定新登录方式的请求，用户ID取自访问令牌
#[derive(Debug, Deserialize)]
pub struct BindIdentityRequest {
    pub identity_type: IdentityType,
    pub identifier: String,
    pub credential: String,
}

impl BindIdentityRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.identifier.is_empty() || self.identifier.len() > 255 {
            return Err(AppError::Validation("标识符不能为空且长度不能超过255"));
        }
        if self.identity_type == IdentityType::PasswordAccount
            && (self.credential.len() < 6 || self.credential.len() > 24)
        {
            return Err(AppError::Validation("密码长度必须在6到24个字符之间"));
        }
        Ok(())
    }
}

/// 账户聚合视图：核心信息 + 资料 + 全部登录方式
#[derive(Debug, Serialize)]
pub struct AccountDetailResponse {
    pub user_id: String,
    pub user_role: UserRole,
    pub status: UserStatus,
    pub nickname: String,
    pub avatar_url: String,
    pub gender: Gender,
    pub province: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub identities: Vec<IdentityResponse>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl UpdatePasswordRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.new_password.len() < 6 || self.new_password.len() > 24 {
            return Err(AppError::Validation("密码长度必须在6到24个字符之间"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_length_counts_chars_not_bytes() {
        let req = UpdateProfileRequest {
            nickname: Some("张三".into()),
            avatar_url: None,
            gender: None,
            province: None,
            city: None,
        };
        // 两个汉字是合法昵称，即使字节数超过2
        assert!(req.validate().is_ok());
    }

    #[test]
    fn bind_request_applies_password_rules_to_password_type() {
        // 密码类身份要求凭证满足密码长度规则
        let req = BindIdentityRequest {
            identity_type: IdentityType::PasswordAccount,
            identifier: "alice_backup".into(),
            credential: "123".into(),
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));

        // 非密码类身份的凭证不受密码长度限制
        let req = BindIdentityRequest {
            identity_type: IdentityType::WechatMiniProgram,
            identifier: "oabc123".into(),
            credential: "".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn identity_response_drops_credential() {
        let json = serde_json::to_value(IdentityResponse {
            identity_id: 1,
            identity_type: IdentityType::PasswordAccount,
            identifier: "alice".into(),
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(json.get("credential").is_none());
    }
}
