use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError};

/// 访问令牌中间件。
///
/// 解析 Bearer 令牌并把声明注入请求扩展。访问令牌的校验是无状态的，
/// 这里不查黑名单；黑名单只在刷新和退出这两个吊销点生效。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth.tokens().parse_access_token(token).map_err(|err| {
        tracing::debug!("访问令牌校验失败: {}", err);
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
