pub mod identity;
pub mod join_query;
pub mod profile;
pub mod user;
