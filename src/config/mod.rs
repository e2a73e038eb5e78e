use std::env;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Access Token 签名密钥
    pub jwt_secret: String,
    /// Refresh Token 签名密钥，与 Access Token 分开管理
    pub jwt_refresh_secret: String,
    /// JWT 签发者，解析时校验
    pub jwt_issuer: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub captcha_ttl_secs: u64,
    pub wechat_appid: String,
    pub wechat_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // Access Token 短期有效（分钟级），Refresh Token 长期有效（天级）
        let access_ttl = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);
        let refresh_ttl = env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        let captcha_ttl = env::var("CAPTCHA_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "user-hub".into()),
            access_token_ttl_secs: access_ttl * 60,
            refresh_token_ttl_secs: refresh_ttl * 24 * 3600,
            captcha_ttl_secs: captcha_ttl * 60,
            wechat_appid: env::var("WECHAT_APPID").unwrap_or_default(),
            wechat_secret: env::var("WECHAT_SECRET").unwrap_or_default(),
        })
    }
}
