use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;

use crate::cache::keys::captcha_key;

/// 手机验证码缓存操作
pub struct CaptchaCacheOperations;

impl CaptchaCacheOperations {
    /// 存储验证码，带短 TTL（默认5分钟）
    pub async fn set_captcha(
        redis: &Arc<RedisClient>,
        phone: &str,
        captcha: &str,
        ttl_secs: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = captcha_key(phone);
        let _: () = conn.set_ex(key, captcha, ttl_secs).await?;

        Ok(())
    }

    /// 读取验证码，过期或未下发时返回 None
    pub async fn get_captcha(
        redis: &Arc<RedisClient>,
        phone: &str,
    ) -> Result<Option<String>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = captcha_key(phone);
        let result: Option<String> = conn.get(key).await?;

        Ok(result)
    }

    /// 删除验证码，校验通过后立即调用，保证单次使用
    pub async fn delete_captcha(
        redis: &Arc<RedisClient>,
        phone: &str,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = captcha_key(phone);
        let _: () = conn.del(key).await?;

        Ok(())
    }
}
