use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{Gender, UserRole, UserStatus};
use crate::models::user::UserWithProfileEntity;

#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub user_id: String,
    pub status: UserStatus,
}

#[derive(Debug, Serialize)]
pub struct UserStatusResponse {
    pub user_id: String,
    pub user_role: UserRole,
    pub status: UserStatus,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub user_id: String,
}

/// 用户列表查询参数，页码从1开始，越界值收敛到合法范围
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<UserStatus>,
    /// 按昵称模糊匹配
    pub nickname: Option<String>,
}

impl ListUsersQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.page_size())
    }
}

/// 列表行：用户核心信息加资料摘要
#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub user_id: String,
    pub user_role: UserRole,
    pub status: UserStatus,
    pub nickname: String,
    pub avatar_url: String,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithProfileEntity> for UserListItem {
    fn from(row: UserWithProfileEntity) -> Self {
        Self {
            user_id: row.user_id,
            user_role: row.user_role,
            status: row.status,
            nickname: row.nickname.unwrap_or_default(),
            avatar_url: row.avatar_url.unwrap_or_default(),
            gender: row.gender.unwrap_or(Gender::Unknown),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub users: Vec<UserListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let query = ListUsersQuery {
            page: None,
            page_size: None,
            status: None,
            nickname: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 20);
        assert_eq!(query.offset(), 0);

        let query = ListUsersQuery {
            page: Some(0),
            page_size: Some(1000),
            status: None,
            nickname: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 100);

        let query = ListUsersQuery {
            page: Some(3),
            page_size: Some(20),
            status: None,
            nickname: None,
        };
        assert_eq!(query.offset(), 40);
    }
}
