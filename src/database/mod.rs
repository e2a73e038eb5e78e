// 数据库模块
// 包含用户、身份、资料三张表的存储操作

pub mod operations;

pub use operations::identity::IdentityOperation;
pub use operations::join_query::UserQueryOperation;
pub use operations::profile::ProfileOperation;
pub use operations::user::UserOperation;
