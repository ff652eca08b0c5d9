//! Client configuration.

use std::time::Duration;

use crate::sync::POOLS_KEY;

/// Default challenge validity in days.
pub const DEFAULT_VALIDITY_DAYS: u32 = 30;

/// Client configuration.
#[derive(Clone, Debug)]
pub struct AmmConfig {
    /// Store key holding the registry snapshot.
    pub store_key: String,
    /// Challenge validity window in days.
    pub validity_days: u32,
    /// Pause after a signature before the value is released.
    pub decrypt_delay: Duration,
    /// Recover and check the signer of every signature.
    /// When false the wallet's own approval prompt is trusted.
    pub verify_signatures: bool,
    /// How long success notices stay visible.
    pub success_notice: Duration,
    /// How long error notices stay visible.
    pub error_notice: Duration,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            store_key: POOLS_KEY.to_string(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            decrypt_delay: Duration::from_millis(1500),
            verify_signatures: true,
            success_notice: Duration::from_millis(2000),
            error_notice: Duration::from_millis(3000),
        }
    }
}

impl AmmConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_key: std::env::var("AMM_STORE_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .unwrap_or(defaults.store_key),
            validity_days: env_parse("AMM_VALIDITY_DAYS")
                .filter(|d| *d > 0)
                .unwrap_or(defaults.validity_days),
            decrypt_delay: env_parse("AMM_DECRYPT_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.decrypt_delay),
            verify_signatures: std::env::var("AMM_VERIFY_SIGNATURES")
                .map(|v| !(v == "false" || v == "0"))
                .unwrap_or(defaults.verify_signatures),
            success_notice: env_parse("AMM_NOTICE_SUCCESS_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.success_notice),
            error_notice: env_parse("AMM_NOTICE_ERROR_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.error_notice),
        }
    }

    /// Config with no artificial delays, for tests and scripted use.
    pub fn immediate() -> Self {
        Self {
            decrypt_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AmmConfig::default();
        assert_eq!(config.store_key, "pools");
        assert_eq!(config.validity_days, 30);
        assert_eq!(config.decrypt_delay, Duration::from_millis(1500));
        assert!(config.verify_signatures);
    }

    #[test]
    fn test_immediate_has_no_delay() {
        assert_eq!(AmmConfig::immediate().decrypt_delay, Duration::ZERO);
    }

    #[test]
    fn test_from_env_overrides() {
        // Only this test reads the environment
        std::env::set_var("AMM_VALIDITY_DAYS", "7");
        std::env::set_var("AMM_DECRYPT_DELAY_MS", "not-a-number");
        std::env::set_var("AMM_VERIFY_SIGNATURES", "false");

        let config = AmmConfig::from_env();
        assert_eq!(config.validity_days, 7);
        assert_eq!(config.decrypt_delay, Duration::from_millis(1500));
        assert!(!config.verify_signatures);

        std::env::remove_var("AMM_VALIDITY_DAYS");
        std::env::remove_var("AMM_DECRYPT_DELAY_MS");
        std::env::remove_var("AMM_VERIFY_SIGNATURES");
    }
}
