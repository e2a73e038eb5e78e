use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_hub::{
    AppState,
    auth::Authenticator,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 设置 Redis 客户端
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let redis = Arc::new(redis_client);

    // 认证核心在启动时构造一次，之后只读共享
    let auth = Arc::new(Authenticator::new(pool.clone(), redis.clone(), &config));

    let state = AppState {
        pool,
        config: config.clone(),
        redis,
        auth,
    };

    // 公开路由：注册、各登录方式、验证码、令牌刷新与吊销
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login/account", post(routes::auth::login_account))
        .route("/auth/login/phone", post(routes::auth::login_phone))
        .route("/auth/login/wechat", post(routes::auth::login_wechat))
        .route("/auth/captcha/send", post(routes::auth::send_captcha))
        .route("/auth/refresh", post(routes::auth::refresh_token))
        .route("/auth/logout", post(routes::auth::logout));

    // 受保护路由：携带有效访问令牌才可访问
    let protected_routes = Router::new()
        .route("/auth/check-token", get(routes::auth::check_token))
        .route(
            "/users/me/profile",
            get(routes::profile::get_my_profile).put(routes::profile::update_my_profile),
        )
        .route("/users/me/account", get(routes::profile::get_my_account))
        .route(
            "/users/me/identities",
            get(routes::profile::list_my_identities).post(routes::profile::bind_identity),
        )
        .route(
            "/users/me/identities/{identity_id}",
            delete(routes::profile::unbind_identity),
        )
        .route("/users/me/password", put(routes::profile::update_my_password))
        .route("/admin/users", get(routes::admin::list_users))
        .route("/admin/users/status", put(routes::admin::update_user_status))
        .route("/admin/users/delete", post(routes::admin::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(log_errors));

    // 开发模式下放开跨域
    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
