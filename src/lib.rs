use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use auth::Authenticator;
use config::Config;

pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod utils;
pub mod wechat;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub auth: Arc<Authenticator>,
}
