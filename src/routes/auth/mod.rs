pub mod handler;
pub mod model;

pub use handler::{
    check_token, login_account, login_phone, login_wechat, logout, refresh_token, register,
    send_captcha,
};
