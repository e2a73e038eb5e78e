// 令牌会话管理
// 刷新令牌的轮换与吊销集中在这一层，黑名单和用户实时状态通过 trait 注入，
// 轮换规则因此可以脱离外部存储单独验证。

use std::future::Future;
use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::cache::operations::token_blacklist::TokenBlacklistOperations;
use crate::database::operations::user::UserOperation;
use crate::error::AppError;
use crate::models::enums::{Platform, UserStatus};
use crate::models::user::UserEntity;

use super::token::{JwtTokens, TokenPair};

/// 吊销名单的读写入口
pub trait RevocationStore: Send + Sync {
    /// 吊销一个 JTI，ttl 为其剩余有效秒数，到期自动出列；ttl <= 0 时无需写入
    fn revoke(&self, jti: &str, ttl_secs: i64)
    -> impl Future<Output = Result<(), AppError>> + Send;

    fn is_revoked(&self, jti: &str) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// 刷新时读取用户实时状态的入口
pub trait UserStateStore: Send + Sync {
    fn find_by_id(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<UserEntity>, AppError>> + Send;
}

pub struct RedisRevocationStore {
    redis: Arc<RedisClient>,
}

impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: &str, ttl_secs: i64) -> Result<(), AppError> {
        TokenBlacklistOperations::add_jti(&self.redis, jti, ttl_secs).await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        Ok(TokenBlacklistOperations::is_blacklisted(&self.redis, jti).await?)
    }
}

pub struct PgUserStateStore {
    pool: PgPool,
}

impl UserStateStore for PgUserStateStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserEntity>, AppError> {
        Ok(UserOperation::find_by_id(&self.pool, user_id).await?)
    }
}

/// 会话管理器。
///
/// 负责令牌对的签发、刷新轮换和退出吊销；
/// 访问令牌的无状态校验仍由 `JwtTokens` 直接承担。
pub struct SessionManager<R = RedisRevocationStore, U = PgUserStateStore> {
    tokens: JwtTokens,
    revocation: R,
    users: U,
}

impl SessionManager {
    pub fn new(tokens: JwtTokens, redis: Arc<RedisClient>, pool: PgPool) -> Self {
        Self::with_stores(
            tokens,
            RedisRevocationStore { redis },
            PgUserStateStore { pool },
        )
    }
}

impl<R: RevocationStore, U: UserStateStore> SessionManager<R, U> {
    pub fn with_stores(tokens: JwtTokens, revocation: R, users: U) -> Self {
        Self {
            tokens,
            revocation,
            users,
        }
    }

    pub fn tokens(&self) -> &JwtTokens {
        &self.tokens
    }

    pub fn issue_pair(&self, user: &UserEntity, platform: Platform) -> Result<TokenPair, AppError> {
        let access_token = self
            .tokens
            .generate_access_token(&user.user_id, user.user_role, user.status, platform)
            .map_err(|err| {
                tracing::error!("生成访问令牌失败: {}", err);
                AppError::System
            })?;
        let refresh_token = self
            .tokens
            .generate_refresh_token(&user.user_id, platform)
            .map_err(|err| {
                tracing::error!("生成刷新令牌失败: {}", err);
                AppError::System
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// 用有效的刷新令牌换取新的令牌对，并吊销旧的刷新令牌。
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.tokens.parse_refresh_token(refresh_token).map_err(|err| {
            tracing::warn!("解析刷新令牌失败: {}", err);
            AppError::InvalidRefreshToken
        })?;

        // 黑名单查询失败是系统错误，必须中止；命中黑名单是业务错误
        if self.revocation.is_revoked(&claims.jti).await? {
            tracing::warn!(user_id = %claims.user_id, jti = %claims.jti, "刷新令牌已被吊销");
            return Err(AppError::RefreshTokenRevoked);
        }

        // 重新读取实时状态：签发后被拉黑的用户到这里为止
        let user = match self.users.find_by_id(&claims.user_id).await? {
            Some(user) => user,
            None => {
                tracing::warn!(user_id = %claims.user_id, "刷新令牌对应的用户不存在");
                return Err(AppError::InvalidRefreshToken);
            }
        };
        if user.status != UserStatus::Active {
            tracing::warn!(user_id = %user.user_id, status = ?user.status, "用户状态异常，拒绝刷新");
            return Err(AppError::UserInactive);
        }

        // 平台沿用旧刷新令牌中的快照
        let pair = self.issue_pair(&user, claims.platform)?;

        // 旧 JTI 按剩余有效期进入黑名单；写入失败只记录，不影响刷新结果，
        // 令牌最终会自然过期
        let ttl = claims.remaining_ttl_secs();
        if let Err(err) = self.revocation.revoke(&claims.jti, ttl).await {
            tracing::error!(jti = %claims.jti, "旧刷新令牌加入黑名单失败: {:?}", err);
        }

        tracing::info!(user_id = %user.user_id, old_jti = %claims.jti, "刷新令牌成功");
        Ok(pair)
    }

    /// 退出登录：吊销传入的刷新令牌。
    ///
    /// 已过期或无法解析的令牌本就不可用，视为已吊销，直接返回成功。
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let claims = match self.tokens.parse_refresh_token(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!("退出登录时令牌解析失败，视为已吊销: {}", err);
                return Ok(());
            }
        };

        let ttl = claims.remaining_ttl_secs();
        if let Err(err) = self.revocation.revoke(&claims.jti, ttl).await {
            // 不阻塞退出流程
            tracing::error!(jti = %claims.jti, "退出登录加入黑名单失败: {:?}", err);
        } else if ttl > 0 {
            tracing::info!(user_id = %claims.user_id, jti = %claims.jti, "退出登录，令牌已吊销");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::config::Config;
    use crate::models::enums::UserRole;

    struct FakeRevocationStore {
        revoked: Mutex<HashMap<String, i64>>,
        fail_writes: bool,
    }

    impl FakeRevocationStore {
        fn new() -> Self {
            Self {
                revoked: Mutex::new(HashMap::new()),
                fail_writes: false,
            }
        }

        fn failing_writes() -> Self {
            Self {
                revoked: Mutex::new(HashMap::new()),
                fail_writes: true,
            }
        }
    }

    impl RevocationStore for FakeRevocationStore {
        async fn revoke(&self, jti: &str, ttl_secs: i64) -> Result<(), AppError> {
            if self.fail_writes {
                return Err(AppError::System);
            }
            if ttl_secs <= 0 {
                return Ok(());
            }
            self.revoked
                .lock()
                .unwrap()
                .insert(jti.to_string(), ttl_secs);
            Ok(())
        }

        async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
            Ok(self.revoked.lock().unwrap().contains_key(jti))
        }
    }

    struct FakeUserStateStore {
        users: Mutex<HashMap<String, UserEntity>>,
    }

    impl FakeUserStateStore {
        fn with_user(user: UserEntity) -> Self {
            let mut users = HashMap::new();
            users.insert(user.user_id.clone(), user);
            Self {
                users: Mutex::new(users),
            }
        }

        fn empty() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }
    }

    impl UserStateStore for FakeUserStateStore {
        async fn find_by_id(&self, user_id: &str) -> Result<Option<UserEntity>, AppError> {
            Ok(self.users.lock().unwrap().get(user_id).cloned())
        }
    }

    fn test_tokens() -> JwtTokens {
        JwtTokens::new(&Config {
            database_url: String::new(),
            redis_url: String::new(),
            server_host: String::new(),
            server_port: 0,
            jwt_secret: "access-secret-for-tests".into(),
            jwt_refresh_secret: "refresh-secret-for-tests".into(),
            jwt_issuer: "user-hub".into(),
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 10 * 24 * 3600,
            captcha_ttl_secs: 300,
            wechat_appid: String::new(),
            wechat_secret: String::new(),
        })
    }

    fn user(user_id: &str, status: UserStatus) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            user_id: user_id.to_string(),
            user_role: UserRole::User,
            status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn manager_for(
        entity: UserEntity,
    ) -> SessionManager<FakeRevocationStore, FakeUserStateStore> {
        SessionManager::with_stores(
            test_tokens(),
            FakeRevocationStore::new(),
            FakeUserStateStore::with_user(entity),
        )
    }

    #[tokio::test]
    async fn rotation_issues_fresh_pair_and_revokes_old_jti() {
        let manager = manager_for(user("u-1", UserStatus::Active));
        let old_refresh = manager
            .tokens()
            .generate_refresh_token("u-1", Platform::App)
            .unwrap();
        let old_jti = manager.tokens().parse_refresh_token(&old_refresh).unwrap().jti;

        let pair = manager.refresh(&old_refresh).await.unwrap();

        let new_claims = manager.tokens().parse_refresh_token(&pair.refresh_token).unwrap();
        assert_ne!(new_claims.jti, old_jti);

        // 旧 JTI 带着剩余有效期进入黑名单，新 JTI 不受影响
        let revoked = manager.revocation.revoked.lock().unwrap();
        let ttl = revoked.get(&old_jti).copied().unwrap();
        assert!(ttl > 0);
        assert!(!revoked.contains_key(&new_claims.jti));
    }

    #[tokio::test]
    async fn rotated_token_cannot_refresh_twice() {
        let manager = manager_for(user("u-1", UserStatus::Active));
        let old_refresh = manager
            .tokens()
            .generate_refresh_token("u-1", Platform::Web)
            .unwrap();

        manager.refresh(&old_refresh).await.unwrap();
        let err = manager.refresh(&old_refresh).await.unwrap_err();
        assert!(matches!(err, AppError::RefreshTokenRevoked));
    }

    #[tokio::test]
    async fn refresh_after_logout_is_rejected() {
        let manager = manager_for(user("u-1", UserStatus::Active));
        let refresh = manager
            .tokens()
            .generate_refresh_token("u-1", Platform::Web)
            .unwrap();

        manager.logout(&refresh).await.unwrap();
        let err = manager.refresh(&refresh).await.unwrap_err();
        assert!(matches!(err, AppError::RefreshTokenRevoked));
    }

    #[tokio::test]
    async fn blacklisted_user_cannot_refresh() {
        let manager = manager_for(user("u-1", UserStatus::Blacklisted));
        let refresh = manager
            .tokens()
            .generate_refresh_token("u-1", Platform::Web)
            .unwrap();

        let err = manager.refresh(&refresh).await.unwrap_err();
        assert!(matches!(err, AppError::UserInactive));
    }

    #[tokio::test]
    async fn missing_user_row_invalidates_refresh() {
        let manager = SessionManager::with_stores(
            test_tokens(),
            FakeRevocationStore::new(),
            FakeUserStateStore::empty(),
        );
        let refresh = manager
            .tokens()
            .generate_refresh_token("u-gone", Platform::Web)
            .unwrap();

        let err = manager.refresh(&refresh).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn revocation_write_failure_does_not_block_refresh() {
        // 黑名单写失败时刷新仍要成功，旧令牌靠自然过期兜底
        let manager = SessionManager::with_stores(
            test_tokens(),
            FakeRevocationStore::failing_writes(),
            FakeUserStateStore::with_user(user("u-1", UserStatus::Active)),
        );
        let refresh = manager
            .tokens()
            .generate_refresh_token("u-1", Platform::Web)
            .unwrap();

        assert!(manager.refresh(&refresh).await.is_ok());
    }

    #[tokio::test]
    async fn logout_with_garbage_token_succeeds_without_writes() {
        let manager = manager_for(user("u-1", UserStatus::Active));

        manager.logout("not-a-jwt").await.unwrap();
        assert!(manager.revocation.revoked.lock().unwrap().is_empty());
    }
}
