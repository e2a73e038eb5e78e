// 领域模型
// 包含枚举定义和数据库实体

pub mod enums;
pub mod user;

pub use enums::{Gender, IdentityType, Platform, UserRole, UserStatus};
pub use user::{UserEntity, UserIdentityEntity, UserProfileEntity, UserWithProfileEntity};
