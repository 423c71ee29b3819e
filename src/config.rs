use std::env;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::domain::notification::Brand;
use crate::infrastructure::payment_gateways::RazorpayCredentials;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_max_size: u32,
    pub db_pool_timeout: std::time::Duration,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub store_brand: Brand,
    pub app_base_url: String,
    pub razorpay: Option<RazorpayCredentials>,
    pub stripe_secret_key: Option<String>,
    pub catalog_cache_ttl: Duration,
    pub catalog_cache_max_entries: usize,
    pub outbox_sweep_interval: std::time::Duration,
    pub outbox_max_attempts: i32,
}

impl Config {
    /// Reads the process environment, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let razorpay = match (vars.optional("RAZORPAY_KEY_ID"), vars.optional("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayCredentials { key_id, key_secret }),
            _ => None,
        };

        Ok(Config {
            database_url: vars.required("DATABASE_URL")?,
            host: vars.optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: vars.parsed("PORT", 8080)?,
            db_pool_max_size: vars.parsed("DB_POOL_MAX_SIZE", 10)?,
            db_pool_timeout: std::time::Duration::from_secs(vars.parsed("DB_POOL_TIMEOUT_SECS", 30)?),
            jwt_secret: vars.required("JWT_SECRET")?,
            access_token_ttl: Duration::seconds(vars.parsed("ACCESS_TOKEN_TTL_SECS", 900)?),
            store_brand: vars.parsed("STORE_BRAND", Brand::Pachmarhi)?,
            app_base_url: vars
                .optional("APP_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            razorpay,
            stripe_secret_key: vars.optional("STRIPE_SECRET_KEY"),
            catalog_cache_ttl: Duration::seconds(vars.parsed("CATALOG_CACHE_TTL_SECS", 300)?),
            catalog_cache_max_entries: vars.parsed("CATALOG_CACHE_MAX_ENTRIES", 500)?,
            outbox_sweep_interval: std::time::Duration::from_secs(
                vars.parsed("OUTBOX_SWEEP_INTERVAL_SECS", 30)?,
            ),
            outbox_max_attempts: vars.parsed("OUTBOX_MAX_ATTEMPTS", 5)?,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Blank values count as unset.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/marketplace"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let c = config(&REQUIRED).unwrap();
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.port, 8080);
        assert_eq!(c.db_pool_max_size, 10);
        assert_eq!(c.access_token_ttl, Duration::minutes(15));
        assert_eq!(c.store_brand, Brand::Pachmarhi);
        assert_eq!(c.app_base_url, "http://localhost:3000");
        assert_eq!(c.catalog_cache_ttl, Duration::minutes(5));
        assert_eq!(c.catalog_cache_max_entries, 500);
        assert_eq!(c.outbox_max_attempts, 5);
        assert!(c.razorpay.is_none());
        assert!(c.stripe_secret_key.is_none());
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = config(&[("DATABASE_URL", "postgres://x")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn malformed_numbers_and_brands_fail() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(matches!(config(&pairs), Err(ConfigError::Invalid { name: "PORT", .. })));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("STORE_BRAND", "acme"));
        assert!(matches!(config(&pairs), Err(ConfigError::Invalid { name: "STORE_BRAND", .. })));
    }

    #[test]
    fn razorpay_needs_both_keys() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RAZORPAY_KEY_ID", "rzp_test"));
        assert!(config(&pairs).unwrap().razorpay.is_none());

        pairs.push(("RAZORPAY_KEY_SECRET", "secret"));
        pairs.push(("STORE_BRAND", "soni"));
        let c = config(&pairs).unwrap();
        assert_eq!(c.razorpay.unwrap().key_id, "rzp_test");
        assert_eq!(c.store_brand, Brand::SoniFashion);
    }
}
