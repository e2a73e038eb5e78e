pub mod captcha;
pub mod token_blacklist;
