use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "auth_logins_total",
        "Login attempts by outcome",
        &["status"]
    ).unwrap();

    pub static ref TOKEN_VALIDATIONS_COUNTER: CounterVec = register_counter_vec!(
        "auth_token_validations_total",
        "Access token validations by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref TOKENS_ISSUED_COUNTER: CounterVec = register_counter_vec!(
        "auth_tokens_issued_total",
        "Token pairs issued and persisted, by flow",
        &["flow"]
    ).unwrap();
}

pub fn record_login(status: &str) {
    LOGINS_COUNTER.with_label_values(&[status]).inc();
}

pub fn record_validation(outcome: &str) {
    TOKEN_VALIDATIONS_COUNTER.with_label_values(&[outcome]).inc();
}

pub fn record_issued(flow: &str) {
    TOKENS_ISSUED_COUNTER.with_label_values(&[flow]).inc();
}
