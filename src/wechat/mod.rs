// 微信小程序登录客户端
// 只负责用临时 code 换取稳定的 openid，换取结果即视为已验证

use serde::Deserialize;

use crate::error::AppError;

const CODE2SESSION_URL: &str = "https://api.weixin.qq.com/sns/jscode2session";

#[derive(Clone)]
pub struct WechatClient {
    http: reqwest::Client,
    appid: String,
    secret: String,
}

/// 微信 code2session 响应。
/// 成功时返回 openid；失败时 errcode 非零且 openid 缺失。
#[derive(Debug, Deserialize)]
struct Code2SessionResponse {
    openid: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

impl WechatClient {
    pub fn new(appid: &str, secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            appid: appid.to_string(),
            secret: secret.to_string(),
        }
    }

    /// 用小程序前端拿到的一次性 code 换取 openid
    pub async fn code_to_session(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(CODE2SESSION_URL)
            .query(&[
                ("appid", self.appid.as_str()),
                ("secret", self.secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::error!("请求微信 code2session 失败: {}", err);
                AppError::WechatExchangeFailed
            })?;

        let body: Code2SessionResponse = response.json().await.map_err(|err| {
            tracing::error!("解析微信 code2session 响应失败: {}", err);
            AppError::WechatExchangeFailed
        })?;

        match body.openid {
            Some(openid) if !openid.is_empty() => Ok(openid),
            _ => {
                tracing::error!(
                    errcode = body.errcode.unwrap_or_default(),
                    errmsg = body.errmsg.as_deref().unwrap_or(""),
                    "微信拒绝了登录凭证"
                );
                Err(AppError::WechatExchangeFailed)
            }
        }
    }
}
