use crate::models::enums::IdentityType;

/// 一次登录请求携带的提供方凭证。
///
/// 三种登录方式共用同一个入口，验证策略按变体分发，
/// 事务性的注册逻辑因此只存在一份。
#[derive(Debug, Clone)]
pub enum ProviderCredential {
    /// 账号 + 明文密码，与存储的 bcrypt 哈希比对
    Password { account: String, password: String },
    /// 手机号 + 短信验证码，与缓存中的验证码精确比对后立即销毁
    Phone { phone: String, code: String },
    /// 微信小程序临时登录凭证，由微信侧换取稳定的 openid
    Wechat { code: String },
}

impl ProviderCredential {
    pub fn identity_type(&self) -> IdentityType {
        match self {
            ProviderCredential::Password { .. } => IdentityType::PasswordAccount,
            ProviderCredential::Phone { .. } => IdentityType::Phone,
            ProviderCredential::Wechat { .. } => IdentityType::WechatMiniProgram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_maps_to_identity_type() {
        let password = ProviderCredential::Password {
            account: "alice".into(),
            password: "pw".into(),
        };
        let phone = ProviderCredential::Phone {
            phone: "13800001111".into(),
            code: "552233".into(),
        };
        let wechat = ProviderCredential::Wechat { code: "abc".into() };

        assert_eq!(password.identity_type(), IdentityType::PasswordAccount);
        assert_eq!(phone.identity_type(), IdentityType::Phone);
        assert_eq!(wechat.identity_type(), IdentityType::WechatMiniProgram);
    }
}
