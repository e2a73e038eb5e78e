use sqlx::{Error as SqlxError, PgConnection, PgPool};

use crate::models::enums::Gender;
use crate::models::user::UserProfileEntity;

/// 用户资料存储库
pub struct ProfileOperation;

impl ProfileOperation {
    /// 在注册事务中创建初始资料，昵称默认取登录标识符
    pub async fn create(
        conn: &mut PgConnection,
        user_id: &str,
        nickname: &str,
    ) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, nickname)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(nickname)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// 按用户ID查找资料。
    ///
    /// 用户存在而资料缺失属于数据损坏，由调用方升级为系统错误。
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<UserProfileEntity>, SqlxError> {
        let profile = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            SELECT id, user_id, nickname, avatar_url, gender, province, city,
                   created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// 部分更新资料，None 字段保持原值
    pub async fn update(
        pool: &PgPool,
        user_id: &str,
        nickname: Option<&str>,
        avatar_url: Option<&str>,
        gender: Option<Gender>,
        province: Option<&str>,
        city: Option<&str>,
    ) -> Result<Option<UserProfileEntity>, SqlxError> {
        let profile = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            UPDATE user_profiles
            SET nickname = COALESCE($1, nickname),
                avatar_url = COALESCE($2, avatar_url),
                gender = COALESCE($3, gender),
                province = COALESCE($4, province),
                city = COALESCE($5, city),
                updated_at = NOW()
            WHERE user_id = $6
            RETURNING id, user_id, nickname, avatar_url, gender, province, city,
                      created_at, updated_at
            "#,
        )
        .bind(nickname)
        .bind(avatar_url)
        .bind(gender)
        .bind(province)
        .bind(city)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }
}
