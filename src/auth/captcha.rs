// 手机验证码流程
// 下发与校验销毁成对出现，存储通过 trait 注入以便脱离 Redis 验证单次使用约束

use std::future::Future;
use std::sync::Arc;

use redis::Client as RedisClient;

use crate::cache::operations::captcha::CaptchaCacheOperations;
use crate::error::AppError;
use crate::utils::generate_captcha;

/// 验证码存取入口
pub trait CaptchaStore: Send + Sync {
    fn set(
        &self,
        phone: &str,
        code: &str,
        ttl_secs: u64,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get(&self, phone: &str) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    fn delete(&self, phone: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

pub struct RedisCaptchaStore {
    redis: Arc<RedisClient>,
}

impl CaptchaStore for RedisCaptchaStore {
    async fn set(&self, phone: &str, code: &str, ttl_secs: u64) -> Result<(), AppError> {
        CaptchaCacheOperations::set_captcha(&self.redis, phone, code, ttl_secs).await?;
        Ok(())
    }

    async fn get(&self, phone: &str) -> Result<Option<String>, AppError> {
        Ok(CaptchaCacheOperations::get_captcha(&self.redis, phone).await?)
    }

    async fn delete(&self, phone: &str) -> Result<(), AppError> {
        CaptchaCacheOperations::delete_captcha(&self.redis, phone).await?;
        Ok(())
    }
}

/// 验证码流程：生成下发 + 校验销毁
pub struct CaptchaFlow<C = RedisCaptchaStore> {
    store: C,
    ttl_secs: u64,
}

impl CaptchaFlow {
    pub fn new(redis: Arc<RedisClient>, ttl_secs: u64) -> Self {
        Self::with_store(RedisCaptchaStore { redis }, ttl_secs)
    }
}

impl<C: CaptchaStore> CaptchaFlow<C> {
    pub fn with_store(store: C, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// 生成验证码并写入缓存，短信下发由外部渠道负责
    pub async fn issue(&self, phone: &str) -> Result<(), AppError> {
        let code = generate_captcha();
        self.store.set(phone, &code, self.ttl_secs).await?;

        tracing::info!("验证码已下发");
        Ok(())
    }

    /// 校验并销毁验证码：缺失、过期、不匹配给出同一个提示
    pub async fn verify_and_consume(&self, phone: &str, code: &str) -> Result<(), AppError> {
        let stored = match self.store.get(phone).await? {
            Some(stored) => stored,
            None => {
                tracing::warn!("验证码不存在或已过期");
                return Err(AppError::CaptchaInvalid);
            }
        };
        if stored != code {
            tracing::warn!("验证码不匹配");
            return Err(AppError::CaptchaInvalid);
        }

        // 用后即删，防止重放；删除失败不影响本次登录
        if let Err(err) = self.store.delete(phone).await {
            tracing::error!("删除已使用的验证码失败: {:?}", err);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    struct FakeCaptchaStore {
        codes: Mutex<HashMap<String, String>>,
    }

    impl FakeCaptchaStore {
        fn new() -> Self {
            Self {
                codes: Mutex::new(HashMap::new()),
            }
        }
    }

    impl CaptchaStore for FakeCaptchaStore {
        async fn set(&self, phone: &str, code: &str, _ttl_secs: u64) -> Result<(), AppError> {
            self.codes
                .lock()
                .unwrap()
                .insert(phone.to_string(), code.to_string());
            Ok(())
        }

        async fn get(&self, phone: &str) -> Result<Option<String>, AppError> {
            Ok(self.codes.lock().unwrap().get(phone).cloned())
        }

        async fn delete(&self, phone: &str) -> Result<(), AppError> {
            self.codes.lock().unwrap().remove(phone);
            Ok(())
        }
    }

    #[tokio::test]
    async fn captcha_is_single_use() {
        let flow = CaptchaFlow::with_store(FakeCaptchaStore::new(), 300);
        flow.store.set("13800001111", "552233", 300).await.unwrap();

        assert!(flow.verify_and_consume("13800001111", "552233").await.is_ok());

        // 校验成功即销毁，同一验证码不能用第二次
        let err = flow
            .verify_and_consume("13800001111", "552233")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CaptchaInvalid));
    }

    #[tokio::test]
    async fn mismatched_code_is_rejected_but_not_consumed() {
        let flow = CaptchaFlow::with_store(FakeCaptchaStore::new(), 300);
        flow.store.set("13800001111", "552233", 300).await.unwrap();

        let err = flow
            .verify_and_consume("13800001111", "000000")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CaptchaInvalid));

        // 输错不销毁，正确的验证码仍然可用
        assert!(flow.verify_and_consume("13800001111", "552233").await.is_ok());
    }

    #[tokio::test]
    async fn issued_code_passes_its_own_verification() {
        let flow = CaptchaFlow::with_store(FakeCaptchaStore::new(), 300);
        flow.issue("13800001111").await.unwrap();

        let code = flow.store.get("13800001111").await.unwrap().unwrap();
        assert!(flow.verify_and_consume("13800001111", &code).await.is_ok());
    }
}
