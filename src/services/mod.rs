pub mod auth;
pub mod codec;
pub mod guard;
pub mod metrics;
pub mod password;
pub mod token_store;
pub mod tokens;
pub mod validator;
