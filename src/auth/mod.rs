// 认证核心模块
// 统一三种登录方式的验证、注册与令牌生命周期管理

use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::database::operations::identity::IdentityOperation;
use crate::database::operations::user::UserOperation;
use crate::error::AppError;
use crate::models::enums::{IdentityType, Platform, UserStatus};
use crate::models::user::UserEntity;
use crate::utils::{hash_password, verify_password};
use crate::wechat::WechatClient;

pub mod captcha;
pub mod credentials;
pub mod identity;
pub mod session;
pub mod token;

pub use credentials::ProviderCredential;
pub use identity::IdentityResolver;
pub use session::SessionManager;
pub use token::{Claims, JwtTokens, TokenPair};

use captcha::CaptchaFlow;

/// 认证编排器。
///
/// 按提供方类型分发凭证验证，复用同一套身份解析与令牌签发流程。
/// 启动时构造一次，放入应用状态共享。
pub struct Authenticator {
    pool: PgPool,
    session: SessionManager,
    captcha: CaptchaFlow,
    resolver: IdentityResolver,
    wechat: WechatClient,
}

impl Authenticator {
    pub fn new(pool: PgPool, redis: Arc<RedisClient>, config: &Config) -> Self {
        Self {
            resolver: IdentityResolver::new(pool.clone()),
            session: SessionManager::new(JwtTokens::new(config), redis.clone(), pool.clone()),
            captcha: CaptchaFlow::new(redis, config.captcha_ttl_secs),
            wechat: WechatClient::new(&config.wechat_appid, &config.wechat_secret),
            pool,
        }
    }

    pub fn tokens(&self) -> &JwtTokens {
        self.session.tokens()
    }

    /// 账号密码注册。注册成功不自动登录，不返回令牌。
    pub async fn register_password(
        &self,
        account: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<String, AppError> {
        if password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        // 先查一次给出友好提示；并发窗口里的重复注册最终由唯一索引拦截
        if IdentityOperation::find_by_type_and_identifier(
            &self.pool,
            IdentityType::PasswordAccount,
            account,
        )
        .await?
        .is_some()
        {
            tracing::warn!("尝试注册已存在的账号");
            return Err(AppError::IdentityExists);
        }

        let hashed = hash_password(password)?;
        let user_id = self
            .resolver
            .register_identity(IdentityType::PasswordAccount, account, &hashed)
            .await?;

        tracing::info!(user_id = %user_id, "账号注册成功");
        Ok(user_id)
    }

    /// 统一登录入口：验证凭证 → 解析或创建身份 → 状态闸门 → 签发令牌对。
    ///
    /// 密码凭证只登录不注册；手机号和微信凭证首次出现时自动注册。
    pub async fn login_or_register(
        &self,
        credential: ProviderCredential,
        platform: Platform,
    ) -> Result<(UserEntity, TokenPair), AppError> {
        let user_id = match credential {
            ProviderCredential::Password { account, password } => {
                let identity = IdentityOperation::find_by_type_and_identifier(
                    &self.pool,
                    IdentityType::PasswordAccount,
                    &account,
                )
                .await?
                .ok_or_else(|| {
                    tracing::warn!("尝试登录不存在的账号");
                    AppError::InvalidCredentials
                })?;

                if !verify_password(&password, &identity.credential)? {
                    tracing::warn!(user_id = %identity.user_id, "登录密码错误");
                    return Err(AppError::InvalidCredentials);
                }
                identity.user_id
            }
            ProviderCredential::Phone { phone, code } => {
                self.captcha.verify_and_consume(&phone, &code).await?;
                self.resolver
                    .resolve_or_create(IdentityType::Phone, &phone, "")
                    .await?
            }
            ProviderCredential::Wechat { code } => {
                let openid = self.wechat.code_to_session(&code).await?;
                self.resolver
                    .resolve_or_create(IdentityType::WechatMiniProgram, &openid, "")
                    .await?
            }
        };

        // 重新读取用户行：角色、状态以落库结果为准，而不是内存里的默认值
        let user = self.load_user(&user_id).await?;
        if user.status != UserStatus::Active {
            tracing::warn!(user_id = %user.user_id, status = ?user.status, "用户状态异常，拒绝登录");
            return Err(AppError::UserInactive);
        }

        let pair = self.session.issue_pair(&user, platform)?;

        tracing::info!(user_id = %user.user_id, platform = ?platform, "登录成功");
        Ok((user, pair))
    }

    /// 用有效的刷新令牌换取新的令牌对，并吊销旧的刷新令牌。
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        self.session.refresh(refresh_token).await
    }

    /// 退出登录：吊销传入的刷新令牌。
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.session.logout(token).await
    }

    /// 生成验证码并写入缓存
    pub async fn issue_captcha(&self, phone: &str) -> Result<(), AppError> {
        self.captcha.issue(phone).await
    }

    /// 为已有用户绑定一种新登录方式。
    ///
    /// 密码类凭证在这里哈希后入库，其余类型的凭证原样存储。
    pub async fn bind_identity(
        &self,
        user_id: &str,
        identity_type: IdentityType,
        identifier: &str,
        credential: &str,
    ) -> Result<(), AppError> {
        // 先查一次给出友好提示；并发绑定最终由唯一索引拦截
        if IdentityOperation::find_by_type_and_identifier(&self.pool, identity_type, identifier)
            .await?
            .is_some()
        {
            tracing::warn!(user_id = %user_id, identity_type = ?identity_type, "尝试绑定已被占用的标识符");
            return Err(AppError::IdentityExists);
        }

        let stored = if identity_type == IdentityType::PasswordAccount {
            hash_password(credential)?
        } else {
            credential.to_string()
        };
        self.resolver
            .bind_identity(user_id, identity_type, identifier, &stored)
            .await
    }

    async fn load_user(&self, user_id: &str) -> Result<UserEntity, AppError> {
        match UserOperation::find_by_id(&self.pool, user_id).await? {
            Some(user) => Ok(user),
            None => {
                // 身份记录指向的用户行缺失，数据已损坏
                tracing::error!(user_id = %user_id, "身份存在但用户行缺失");
                Err(AppError::DataCorruption)
            }
        }
    }
}
