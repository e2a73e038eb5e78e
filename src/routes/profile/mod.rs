pub mod handler;
pub mod model;

pub use handler::{
    bind_identity, get_my_account, get_my_profile, list_my_identities, unbind_identity,
    update_my_password, update_my_profile,
};
