pub mod handler;
pub mod model;

pub use handler::{delete_user, list_users, update_user_status};
