use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::enums::{Gender, IdentityType, UserRole, UserStatus};

/// 用户核心实体，角色与状态变更只经过用户操作层
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    pub user_id: String,
    pub user_role: UserRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 软删除时间戳，查询默认过滤已删除行
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 用户身份实体
///
/// 一个用户可以持有多种登录方式，但每条身份记录只属于一个用户；
/// (identity_type, identifier) 上的唯一索引是防止并发重复注册的唯一依据。
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserIdentityEntity {
    pub identity_id: i64,
    pub user_id: String,
    pub identity_type: IdentityType,
    /// 账号名、openid 或手机号
    pub identifier: String,
    /// 密码哈希；验证码和 OAuth 类身份此列为空串
    #[serde(skip_serializing)]
    pub credential: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户与资料的联合查询行，供管理端列表使用。
/// 资料侧来自 LEFT JOIN，行缺失时为 None。
#[derive(Debug, Clone, FromRow)]
pub struct UserWithProfileEntity {
    pub user_id: String,
    pub user_role: UserRole,
    pub status: UserStatus,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户资料实体，与用户一比一，注册事务中一并创建
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfileEntity {
    #[serde(skip_serializing)]
    pub id: i64,
    pub user_id: String,
    pub nickname: String,
    pub avatar_url: String,
    pub gender: Gender,
    pub province: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
