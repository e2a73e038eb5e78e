use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::models::enums::{Platform, UserRole, UserStatus};

/// JWT 声明。
///
/// 访问令牌与刷新令牌共用同一结构，但使用不同密钥和有效期签名。
/// 其中的角色与状态是签发时刻的快照，令牌签发后不再变化，
/// 只有刷新流程会重新读取数据库里的实时状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub platform: Platform,
    /// 每个令牌唯一的ID，黑名单以它为键
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// 令牌剩余有效秒数，已过期时为负数
    pub fn remaining_ttl_secs(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }
}

/// 访问令牌与刷新令牌对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT 签发与解析工具，持有两类令牌各自的密钥
#[derive(Clone)]
pub struct JwtTokens {
    access_secret: String,
    refresh_secret: String,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtTokens {
    pub fn new(config: &Config) -> Self {
        Self {
            access_secret: config.jwt_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            access_ttl_secs: config.access_token_ttl_secs as i64,
            refresh_ttl_secs: config.refresh_token_ttl_secs as i64,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: &str,
        role: UserRole,
        status: UserStatus,
        platform: Platform,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate(user_id, role, status, platform, &self.access_secret, self.access_ttl_secs)
    }

    /// 刷新令牌不携带有效的角色与状态，统一写入默认值；
    /// 刷新时以数据库中的实时状态为准。
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.generate(
            user_id,
            UserRole::Guest,
            UserStatus::Active,
            platform,
            &self.refresh_secret,
            self.refresh_ttl_secs,
        )
    }

    pub fn parse_access_token(
        &self,
        token: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.parse(token, &self.access_secret)
    }

    pub fn parse_refresh_token(
        &self,
        token: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.parse(token, &self.refresh_secret)
    }

    fn generate(
        &self,
        user_id: &str,
        role: UserRole,
        status: UserStatus,
        platform: Platform,
        secret: &str,
        ttl_secs: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            user_id: user_id.to_string(),
            role,
            status,
            platform,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl_secs,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// 校验签名、过期时间和签发者；黑名单检查由调用方在需要时执行
    fn parse(&self, token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tokens() -> JwtTokens {
        JwtTokens {
            access_secret: "access-secret-for-tests".into(),
            refresh_secret: "refresh-secret-for-tests".into(),
            issuer: "user-hub".into(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 10 * 24 * 3600,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let tokens = test_tokens();
        let token = tokens
            .generate_access_token("u-1", UserRole::User, UserStatus::Active, Platform::Web)
            .unwrap();

        let claims = tokens.parse_access_token(&token).unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.status, UserStatus::Active);
        assert_eq!(claims.platform, Platform::Web);
        assert_eq!(claims.iss, "user-hub");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn refresh_token_rejected_by_access_parser() {
        let tokens = test_tokens();
        let refresh = tokens
            .generate_refresh_token("u-1", Platform::App)
            .unwrap();

        // 两类令牌密钥不同，互相解析必须失败
        assert!(tokens.parse_access_token(&refresh).is_err());
        assert!(tokens.parse_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let tokens = test_tokens();
        let a = tokens
            .generate_access_token("u-1", UserRole::User, UserStatus::Active, Platform::Web)
            .unwrap();
        let b = tokens
            .generate_access_token("u-1", UserRole::User, UserStatus::Active, Platform::Web)
            .unwrap();

        let ca = tokens.parse_access_token(&a).unwrap();
        let cb = tokens.parse_access_token(&b).unwrap();
        assert_ne!(ca.jti, cb.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = test_tokens();
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: "u-1".into(),
            role: UserRole::User,
            status: UserStatus::Active,
            platform: Platform::Web,
            jti: Uuid::new_v4().to_string(),
            iss: "user-hub".into(),
            iat: now - 7200,
            // 留出足够余量，避开解析器默认的时钟偏移容忍
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("access-secret-for-tests".as_bytes()),
        )
        .unwrap();

        assert!(tokens.parse_access_token(&token).is_err());
        assert!(claims.remaining_ttl_secs() < 0);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let tokens = test_tokens();
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: "u-1".into(),
            role: UserRole::User,
            status: UserStatus::Active,
            platform: Platform::Web,
            jti: Uuid::new_v4().to_string(),
            iss: "someone-else".into(),
            iat: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("access-secret-for-tests".as_bytes()),
        )
        .unwrap();

        assert!(tokens.parse_access_token(&token).is_err());
    }

    #[test]
    fn claims_json_shape_is_stable() {
        let tokens = test_tokens();
        let token = tokens
            .generate_access_token("u-1", UserRole::Admin, UserStatus::Active, Platform::MiniProgram)
            .unwrap();
        let claims = tokens.parse_access_token(&token).unwrap();

        let json = serde_json::to_value(&claims).unwrap();
        for field in ["user_id", "role", "status", "platform", "jti", "iss", "iat", "exp"] {
            assert!(json.get(field).is_some(), "缺少声明字段 {field}");
        }
        assert_eq!(json["role"], "admin");
        assert_eq!(json["platform"], "mini-program");
    }
}
