use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::database::operations::identity::IdentityOperation;
use crate::database::operations::profile::ProfileOperation;
use crate::database::operations::user::UserOperation;
use crate::error::AppError;
use crate::models::enums::{IdentityType, UserRole, UserStatus};

/// 身份解析器。
///
/// 负责把 (身份类型, 外部标识符) 映射到用户ID；首次出现的标识符会在
/// 一个事务里同时创建用户、身份和初始资料，三者要么全部落库要么全部回滚。
pub struct IdentityResolver {
    pool: PgPool,
}

impl IdentityResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 查找标识符对应的用户，不存在则自动注册，返回用户ID。
    ///
    /// 凭证按调用方传入的值原样存储：密码类身份传入的已是哈希，
    /// 验证码和 OAuth 类身份传空串。
    pub async fn resolve_or_create(
        &self,
        identity_type: IdentityType,
        identifier: &str,
        credential: &str,
    ) -> Result<String, AppError> {
        if let Some(identity) =
            IdentityOperation::find_by_type_and_identifier(&self.pool, identity_type, identifier)
                .await?
        {
            return Ok(identity.user_id);
        }

        tracing::info!(
            identity_type = ?identity_type,
            "标识符首次出现，开始自动注册"
        );
        self.register_identity(identity_type, identifier, credential)
            .await
    }

    /// 事务内创建用户 + 身份 + 初始资料，返回新用户ID。
    ///
    /// 并发下两个请求同时注册同一标识符时，唯一索引会让后提交的
    /// 事务失败，这里把冲突转换成"已注册"业务错误。
    pub async fn register_identity(
        &self,
        identity_type: IdentityType,
        identifier: &str,
        credential: &str,
    ) -> Result<String, AppError> {
        let user_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        let created: Result<(), SqlxError> = async {
            UserOperation::create(&mut *tx, &user_id, UserRole::User, UserStatus::Active).await?;
            IdentityOperation::create(&mut *tx, &user_id, identity_type, identifier, credential)
                .await?;
            // 初始昵称取登录标识符，用户之后可以自行修改
            ProfileOperation::create(&mut *tx, &user_id, identifier).await?;
            Ok(())
        }
        .await;

        if let Err(err) = created {
            tx.rollback().await.ok();
            if is_unique_violation(&err) {
                tracing::warn!(
                    identity_type = ?identity_type,
                    "注册时标识符已被占用"
                );
                return Err(AppError::IdentityExists);
            }
            tracing::error!("注册事务失败: {:?}", err);
            return Err(AppError::System);
        }

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "用户自动注册成功（用户、身份、初始资料）");
        Ok(user_id)
    }

    /// 给已有用户追加一条身份记录，标识符冲突转换为"已注册"业务错误
    pub async fn bind_identity(
        &self,
        user_id: &str,
        identity_type: IdentityType,
        identifier: &str,
        credential: &str,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        if let Err(err) =
            IdentityOperation::create(&mut *conn, user_id, identity_type, identifier, credential)
                .await
        {
            if is_unique_violation(&err) {
                tracing::warn!(
                    user_id = %user_id,
                    identity_type = ?identity_type,
                    "绑定时标识符已被占用"
                );
                return Err(AppError::IdentityExists);
            }
            tracing::error!("绑定身份失败: {:?}", err);
            return Err(AppError::System);
        }

        tracing::info!(user_id = %user_id, identity_type = ?identity_type, "身份绑定成功");
        Ok(())
    }
}

fn is_unique_violation(err: &SqlxError) -> bool {
    matches!(err, SqlxError::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 需要一套已执行迁移的本地 Postgres，平时跳过，
    // 排查注册事务问题时手动执行: cargo test -- --ignored
    #[tokio::test]
    #[ignore = "需要 DATABASE_URL 指向已迁移的 Postgres"]
    async fn duplicate_identifier_registration_rolls_back() {
        let pool = sqlx::PgPool::connect(&std::env::var("DATABASE_URL").unwrap())
            .await
            .unwrap();
        let resolver = IdentityResolver::new(pool.clone());

        let identifier = format!("it-{}", Uuid::new_v4());
        resolver
            .register_identity(IdentityType::Phone, &identifier, "")
            .await
            .unwrap();

        let users_before: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();

        // 重复注册必须整体回滚：不产生孤儿用户行，身份行也只有一条
        let err = resolver
            .register_identity(IdentityType::Phone, &identifier, "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IdentityExists));

        let users_after: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users_before, users_after);

        let identity_rows: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_identities WHERE identifier = $1")
                .bind(&identifier)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(identity_rows, 1);
    }
}
