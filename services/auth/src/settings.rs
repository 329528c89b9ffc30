//! Service configuration
//!
//! Built-in defaults layered under `SESSION_*` environment variables.

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

use crate::{authenticator::SessionPolicy, policy::AccessPolicy};

/// Longest accepted duration setting, ten years in seconds
const MAX_DURATION_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Session and listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Lifetime of a regular session (`SESSION_DEFAULT_TTL_SECONDS`, default 3 hours)
    pub default_ttl_seconds: i64,
    /// Lifetime of a bootstrap session (`SESSION_BOOTSTRAP_TTL_SECONDS`, default 15 minutes)
    pub bootstrap_ttl_seconds: i64,
    /// Remaining lifetime under which a used session is renewed
    /// (`SESSION_RENEW_THRESHOLD_SECONDS`, default 1 hour)
    pub renew_threshold_seconds: i64,
    /// Period of the expired-session sweep (`SESSION_SWEEP_INTERVAL_SECONDS`, default 10 minutes)
    pub sweep_interval_seconds: i64,
    /// Listen address (`SESSION_BIND_ADDRESS`)
    pub bind_address: String,
    /// Comma-separated paths open to bootstrap sessions (`SESSION_BOOTSTRAP_PATHS`)
    pub bootstrap_paths: String,
    /// Comma-separated path prefixes reserved to admins (`SESSION_ADMIN_PATH_PREFIXES`)
    pub admin_path_prefixes: String,
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl SessionSettings {
    /// Load settings from the environment on top of the defaults
    pub fn from_env() -> Result<Self> {
        let settings: SessionSettings = Config::builder()
            .set_default("default_ttl_seconds", 10_800_i64)?
            .set_default("bootstrap_ttl_seconds", 900_i64)?
            .set_default("renew_threshold_seconds", 3_600_i64)?
            .set_default("sweep_interval_seconds", 600_i64)?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default(
                "bootstrap_paths",
                "/,/login,/api/login,/api/logout,/api/session,/api/users",
            )?
            .set_default("admin_path_prefixes", "/api/users")?
            .add_source(Environment::with_prefix("SESSION"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("default_ttl_seconds", self.default_ttl_seconds),
            ("bootstrap_ttl_seconds", self.bootstrap_ttl_seconds),
            ("renew_threshold_seconds", self.renew_threshold_seconds),
            ("sweep_interval_seconds", self.sweep_interval_seconds),
        ] {
            if value <= 0 {
                anyhow::bail!("{} must be positive, got {}", name, value);
            }
            if value > MAX_DURATION_SECONDS {
                anyhow::bail!(
                    "{} must be at most {}, got {}",
                    name,
                    MAX_DURATION_SECONDS,
                    value
                );
            }
        }

        Ok(())
    }

    /// TTL applied to regular sessions
    pub fn default_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.default_ttl_seconds)
    }

    /// Bootstrap TTL and renewal threshold
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            bootstrap_ttl: chrono::Duration::seconds(self.bootstrap_ttl_seconds),
            renew_threshold: chrono::Duration::seconds(self.renew_threshold_seconds),
        }
    }

    /// Period of the expired-session sweep
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_seconds.unsigned_abs())
    }

    /// Path policy built from the configured lists
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(
            split_list(&self.bootstrap_paths),
            split_list(&self.admin_path_prefixes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "SESSION_DEFAULT_TTL_SECONDS",
        "SESSION_BOOTSTRAP_TTL_SECONDS",
        "SESSION_RENEW_THRESHOLD_SECONDS",
        "SESSION_SWEEP_INTERVAL_SECONDS",
        "SESSION_BIND_ADDRESS",
        "SESSION_BOOTSTRAP_PATHS",
        "SESSION_ADMIN_PATH_PREFIXES",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let settings = SessionSettings::from_env().unwrap();
        assert_eq!(settings.default_ttl(), chrono::Duration::hours(3));
        assert_eq!(
            settings.session_policy().bootstrap_ttl,
            chrono::Duration::minutes(15)
        );
        assert_eq!(
            settings.session_policy().renew_threshold,
            chrono::Duration::hours(1)
        );
        assert_eq!(settings.sweep_interval(), std::time::Duration::from_secs(600));
        assert_eq!(settings.bind_address, "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("SESSION_DEFAULT_TTL_SECONDS", "7200");
            std::env::set_var("SESSION_BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("SESSION_BOOTSTRAP_PATHS", " /setup , ,/login");
        }

        let settings = SessionSettings::from_env().unwrap();
        assert_eq!(settings.default_ttl(), chrono::Duration::hours(2));
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert_eq!(
            split_list(&settings.bootstrap_paths),
            vec!["/setup".to_string(), "/login".to_string()]
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_non_positive_durations_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("SESSION_SWEEP_INTERVAL_SECONDS", "0");
        }

        assert!(SessionSettings::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_oversized_durations_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("SESSION_DEFAULT_TTL_SECONDS", "9300000000000000");
        }
        assert!(SessionSettings::from_env().is_err());

        unsafe {
            std::env::set_var("SESSION_DEFAULT_TTL_SECONDS", "315360001");
        }
        assert!(SessionSettings::from_env().is_err());

        unsafe {
            std::env::set_var("SESSION_DEFAULT_TTL_SECONDS", "315360000");
        }
        let settings = SessionSettings::from_env().unwrap();
        assert_eq!(settings.default_ttl(), chrono::Duration::days(3650));

        clear_env();
    }
}
