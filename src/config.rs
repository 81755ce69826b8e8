use std::env;

use crate::{errors::AuthError, services::tokens::MAX_TTL_SECONDS};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same parsing as [`Config::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> anyhow::Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Configuration(format!("Missing required env var: {key}")).into())
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let config = Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl_seconds: or_default("ACCESS_TOKEN_TTL_SECONDS", "86400").parse()?,
            refresh_token_ttl_seconds: or_default("REFRESH_TOKEN_TTL_SECONDS", "604800").parse()?,
            bcrypt_cost: or_default("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string()).parse()?,
            host: or_default("HOST", "0.0.0.0"),
            port: or_default("PORT", "8080").parse()?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.access_token_ttl_seconds == 0 {
            return Err(AuthError::Configuration(
                "ACCESS_TOKEN_TTL_SECONDS must be positive".into(),
            ));
        }
        if self.refresh_token_ttl_seconds <= self.access_token_ttl_seconds {
            return Err(AuthError::Configuration(
                "REFRESH_TOKEN_TTL_SECONDS must be greater than ACCESS_TOKEN_TTL_SECONDS".into(),
            ));
        }
        if self.refresh_token_ttl_seconds > MAX_TTL_SECONDS {
            return Err(AuthError::Configuration(format!(
                "REFRESH_TOKEN_TTL_SECONDS must not exceed {MAX_TTL_SECONDS}"
            )));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(AuthError::Configuration("BCRYPT_COST must be within 4..=31".into()));
        }
        Ok(())
    }
}
