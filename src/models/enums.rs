use serde::{Deserialize, Serialize};

/// 用户角色（数据库存储为整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Guest = 0,
    User = 1,
    Admin = 2,
}

/// 用户状态，非 Active 状态禁止登录和刷新令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active = 0,
    Blacklisted = 1,
}

/// 身份类型，(类型, 标识符) 全局唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum IdentityType {
    /// 账号密码（网站）
    PasswordAccount = 0,
    /// 微信（小程序）
    WechatMiniProgram = 1,
    /// 手机号（APP）
    Phone = 2,
}

/// 客户端平台，签发令牌时写入声明，不再回读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Web,
    App,
    MiniProgram,
}

/// 性别，封闭枚举，非法取值在反序列化时即被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Unknown = 0,
    Male = 1,
    Female = 2,
}
