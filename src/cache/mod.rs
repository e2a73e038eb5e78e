// 缓存模块
// 包含验证码存储和令牌黑名单的 Redis 操作

pub mod keys;
pub mod operations;

pub use operations::captcha::CaptchaCacheOperations;
pub use operations::token_blacklist::TokenBlacklistOperations;
