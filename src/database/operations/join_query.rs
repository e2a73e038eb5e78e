use sqlx::{Error as SqlxError, PgPool};

use crate::models::enums::UserStatus;
use crate::models::user::UserWithProfileEntity;

/// 跨表联合查询，与单表存储库分开维护
pub struct UserQueryOperation;

impl UserQueryOperation {
    /// 分页查询用户及其资料，可按状态过滤、按昵称模糊匹配。
    /// 过滤参数为 None 时对应条件不生效。
    pub async fn list_with_profiles(
        pool: &PgPool,
        status: Option<UserStatus>,
        nickname_like: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserWithProfileEntity>, SqlxError> {
        let rows = sqlx::query_as::<_, UserWithProfileEntity>(
            r#"
            SELECT u.user_id, u.user_role, u.status,
                   p.nickname, p.avatar_url, p.gender, p.province, p.city,
                   u.created_at, u.updated_at
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.user_id
            WHERE u.deleted_at IS NULL
              AND ($1::INT IS NULL OR u.status = $1)
              AND ($2::VARCHAR IS NULL OR p.nickname LIKE '%' || $2 || '%')
            ORDER BY u.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(status)
        .bind(nickname_like)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// 符合过滤条件的总记录数，分页之前统计
    pub async fn count(
        pool: &PgPool,
        status: Option<UserStatus>,
        nickname_like: Option<&str>,
    ) -> Result<i64, SqlxError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.user_id
            WHERE u.deleted_at IS NULL
              AND ($1::INT IS NULL OR u.status = $1)
              AND ($2::VARCHAR IS NULL OR p.nickname LIKE '%' || $2 || '%')
            "#,
        )
        .bind(status)
        .bind(nickname_like)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }
}
