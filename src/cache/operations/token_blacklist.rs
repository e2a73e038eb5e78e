use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;

use crate::cache::keys::blacklist_jti_key;

/// 令牌黑名单操作
///
/// 键的过期时间等于对应令牌的剩余有效期，黑名单体积因此被限制在
/// 未过期令牌的总量之内。
pub struct TokenBlacklistOperations;

impl TokenBlacklistOperations {
    /// 将 JTI 加入黑名单，ttl 为令牌剩余有效秒数。
    ///
    /// ttl <= 0 说明令牌已自然过期，无需保护，直接跳过。
    pub async fn add_jti(
        redis: &Arc<RedisClient>,
        jti: &str,
        ttl_secs: i64,
    ) -> Result<(), redis::RedisError> {
        if ttl_secs <= 0 {
            tracing::debug!("令牌已过期，JTI {} 无需加入黑名单", jti);
            return Ok(());
        }

        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = blacklist_jti_key(jti);
        let _: () = conn.set_ex(key, "blacklisted", ttl_secs as u64).await?;

        Ok(())
    }

    /// 检查 JTI 是否在黑名单中。
    ///
    /// 不存在是常态而不是错误，返回 false。
    pub async fn is_blacklisted(
        redis: &Arc<RedisClient>,
        jti: &str,
    ) -> Result<bool, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = blacklist_jti_key(jti);
        let exists: bool = conn.exists(key).await?;

        Ok(exists)
    }
}
