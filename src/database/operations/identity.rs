use sqlx::{Error as SqlxError, PgConnection, PgPool};

use crate::models::enums::IdentityType;
use crate::models::user::UserIdentityEntity;

/// 身份存储库
///
/// (identity_type, identifier) 上的唯一索引是并发注册的最终裁决：
/// 两个事务同时插入同一标识符时，后提交者会收到唯一约束冲突。
pub struct IdentityOperation;

impl IdentityOperation {
    /// 在事务中插入身份行
    pub async fn create(
        conn: &mut PgConnection,
        user_id: &str,
        identity_type: IdentityType,
        identifier: &str,
        credential: &str,
    ) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            INSERT INTO user_identities (user_id, identity_type, identifier, credential)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(identity_type)
        .bind(identifier)
        .bind(credential)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// 按 (身份类型, 标识符) 查找身份记录
    pub async fn find_by_type_and_identifier(
        pool: &PgPool,
        identity_type: IdentityType,
        identifier: &str,
    ) -> Result<Option<UserIdentityEntity>, SqlxError> {
        let identity = sqlx::query_as::<_, UserIdentityEntity>(
            r#"
            SELECT identity_id, user_id, identity_type, identifier, credential,
                   created_at, updated_at
            FROM user_identities
            WHERE identity_type = $1 AND identifier = $2
            "#,
        )
        .bind(identity_type)
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(identity)
    }

    /// 列出用户绑定的全部身份
    pub async fn list_by_user_id(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<UserIdentityEntity>, SqlxError> {
        let identities = sqlx::query_as::<_, UserIdentityEntity>(
            r#"
            SELECT identity_id, user_id, identity_type, identifier, credential,
                   created_at, updated_at
            FROM user_identities
            WHERE user_id = $1
            ORDER BY identity_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(identities)
    }

    /// 解绑身份，同时校验归属，避免删到别人的记录
    pub async fn delete(pool: &PgPool, identity_id: i64, user_id: &str) -> Result<bool, SqlxError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_identities
            WHERE identity_id = $1 AND user_id = $2
            "#,
        )
        .bind(identity_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 更新身份凭证（修改密码时使用，传入的已是哈希值）
    pub async fn update_credential(
        pool: &PgPool,
        identity_id: i64,
        credential: &str,
    ) -> Result<bool, SqlxError> {
        let result = sqlx::query(
            r#"
            UPDATE user_identities
            SET credential = $1, updated_at = NOW()
            WHERE identity_id = $2
            "#,
        )
        .bind(credential)
        .bind(identity_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
