use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

/// 记录所有 5xx 响应，业务错误（HTTP 200 + 非零 code）不在此处打点
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        error!(
            "服务端错误 - {} {} 返回 {}",
            method,
            path,
            response.status()
        );
    }

    response
}
