use sqlx::{Error as SqlxError, PgConnection, PgPool};

use crate::models::enums::{UserRole, UserStatus};
use crate::models::user::UserEntity;

/// 用户存储库，处理用户核心信息的数据库操作
pub struct UserOperation;

impl UserOperation {
    /// 在事务中插入用户行。
    ///
    /// 接收 `&mut PgConnection` 以便与身份、资料的插入共用同一个事务。
    pub async fn create(
        conn: &mut PgConnection,
        user_id: &str,
        role: UserRole,
        status: UserStatus,
    ) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, user_role, status)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(status)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// 按主键查找用户，已软删除的行视为不存在
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<UserEntity>, SqlxError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT user_id, user_role, status, created_at, updated_at, deleted_at
            FROM users
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// 更新用户状态（拉黑 / 恢复），已签发的令牌在下次刷新时才受影响
    pub async fn update_status(
        pool: &PgPool,
        user_id: &str,
        status: UserStatus,
    ) -> Result<Option<UserEntity>, SqlxError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET status = $1, updated_at = NOW()
            WHERE user_id = $2 AND deleted_at IS NULL
            RETURNING user_id, user_role, status, created_at, updated_at, deleted_at
            "#,
        )
        .bind(status)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// 软删除用户，身份与资料行由外键级联约束在硬删除时一并清理
    pub async fn soft_delete(pool: &PgPool, user_id: &str) -> Result<bool, SqlxError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
