//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_LOGIN_URL` - Where to send visitors without a session (default: login.html)
//! - `STOREFRONT_PAYMENT_URL` - External checkout page (default: payment.html)
//! - `STOREFRONT_SESSION_KEY` - Session storage key of the login flag (default: loggedIn)
//! - `STOREFRONT_PULSE_MS` - Add-to-cart pulse duration in milliseconds, at most 60000 (default: 300)
//! - `STOREFRONT_CATALOG` - Path to a JSON catalog; the sample catalog is used when unset

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

const DEFAULT_LOGIN_URL: &str = "login.html";
const DEFAULT_PAYMENT_URL: &str = "payment.html";
const DEFAULT_SESSION_KEY: &str = "loggedIn";
const DEFAULT_PULSE_MS: i64 = 300;
const MAX_PULSE_MS: i64 = 60_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub login_url: String,
    pub payment_url: String,
    pub session_key: String,
    pub pulse: Duration,
    pub catalog_path: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            payment_url: DEFAULT_PAYMENT_URL.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            pulse: Duration::milliseconds(DEFAULT_PULSE_MS),
            catalog_path: None,
        }
    }
}

impl WidgetConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let pulse = match get("STOREFRONT_PULSE_MS") {
            Some(raw) => parse_pulse(&raw)?,
            None => defaults.pulse,
        };

        Ok(Self {
            login_url: get("STOREFRONT_LOGIN_URL").unwrap_or(defaults.login_url),
            payment_url: get("STOREFRONT_PAYMENT_URL").unwrap_or(defaults.payment_url),
            session_key: get("STOREFRONT_SESSION_KEY").unwrap_or(defaults.session_key),
            pulse,
            catalog_path: get("STOREFRONT_CATALOG").map(PathBuf::from),
        })
    }
}

fn parse_pulse(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("STOREFRONT_PULSE_MS".into(), reason);
    let ms = raw.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    match i64::try_from(ms) {
        Ok(ms) if ms <= MAX_PULSE_MS => Ok(Duration::milliseconds(ms)),
        _ => Err(invalid(format!("{ms} exceeds the {MAX_PULSE_MS} ms maximum"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.login_url, "login.html");
        assert_eq!(config.pulse, Duration::milliseconds(300));
    }

    #[test]
    fn test_overrides() {
        let config = WidgetConfig::from_lookup(lookup(&[
            ("STOREFRONT_PAYMENT_URL", "https://pay.example/checkout"),
            ("STOREFRONT_PULSE_MS", "150"),
            ("STOREFRONT_CATALOG", "catalog.json"),
            ("STOREFRONT_LOGIN_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.payment_url, "https://pay.example/checkout");
        assert_eq!(config.pulse, Duration::milliseconds(150));
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.login_url, "login.html");
    }

    #[test]
    fn test_invalid_pulse() {
        let err = WidgetConfig::from_lookup(lookup(&[("STOREFRONT_PULSE_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PULSE_MS"));
        let err = WidgetConfig::from_lookup(lookup(&[("STOREFRONT_PULSE_MS", "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_pulse_upper_bound() {
        let config = WidgetConfig::from_lookup(lookup(&[("STOREFRONT_PULSE_MS", "60000")])).unwrap();
        assert_eq!(config.pulse, Duration::milliseconds(60_000));
        for raw in ["60001", "9000000000000000", "18446744073709551615"] {
            let err = WidgetConfig::from_lookup(lookup(&[("STOREFRONT_PULSE_MS", raw)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(key, reason) if key == "STOREFRONT_PULSE_MS" && reason.contains("maximum")));
        }
    }
}
