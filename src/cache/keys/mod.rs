/// 验证码缓存键前缀
const CAPTCHA_PREFIX: &str = "captcha:";

/// 令牌黑名单键前缀，按 JTI 存储
const BLACKLIST_JTI_PREFIX: &str = "blacklist:jti:";

/// 生成手机验证码缓存键
pub fn captcha_key(phone: &str) -> String {
    format!("{}{}", CAPTCHA_PREFIX, phone)
}

/// 生成 JTI 黑名单键
pub fn blacklist_jti_key(jti: &str) -> String {
    format!("{}{}", BLACKLIST_JTI_PREFIX, jti)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(captcha_key("13800001111"), "captcha:13800001111");
        assert_eq!(
            blacklist_jti_key("3f2a"),
            "blacklist:jti:3f2a"
        );
    }
}
