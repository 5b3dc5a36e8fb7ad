use crate::i18n::{LOCALE_COOKIE_KEY, LOCALE_STORAGE_KEY};
use crate::time_range::{TimeRangeKey, DEFAULT_TIME_RANGE, TIME_RANGE_STORAGE_KEY};
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // Locale persistence
    pub locale_cookie_name: String,
    pub locale_storage_key: String,
    pub cookie_max_age_secs: u64,

    // Analytics time range
    pub time_range_storage_key: String,
    pub default_time_range: TimeRangeKey,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale_cookie_name: LOCALE_COOKIE_KEY.to_string(),
            locale_storage_key: LOCALE_STORAGE_KEY.to_string(),
            cookie_max_age_secs: 31_536_000,
            time_range_storage_key: TIME_RANGE_STORAGE_KEY.to_string(),
            default_time_range: DEFAULT_TIME_RANGE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_time_range = match std::env::var("DEFAULT_TIME_RANGE") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("DEFAULT_TIME_RANGE is invalid: '{}'", value))?,
            Err(_) => defaults.default_time_range,
        };

        Ok(Self {
            // Locale persistence
            locale_cookie_name: std::env::var("LOCALE_COOKIE_NAME")
                .unwrap_or(defaults.locale_cookie_name),
            locale_storage_key: std::env::var("LOCALE_STORAGE_KEY")
                .unwrap_or(defaults.locale_storage_key),
            cookie_max_age_secs: std::env::var("LOCALE_COOKIE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cookie_max_age_secs),

            // Analytics time range
            time_range_storage_key: std::env::var("TIME_RANGE_STORAGE_KEY")
                .unwrap_or(defaults.time_range_storage_key),
            default_time_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const CONFIG_VARS: [&str; 5] = [
        "LOCALE_COOKIE_NAME",
        "LOCALE_STORAGE_KEY",
        "LOCALE_COOKIE_MAX_AGE",
        "TIME_RANGE_STORAGE_KEY",
        "DEFAULT_TIME_RANGE",
    ];

    fn clear_env() {
        for key in CONFIG_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.locale_cookie_name, "APP_LOCALE");
        assert_eq!(config.locale_storage_key, "app_locale");
        assert_eq!(config.cookie_max_age_secs, 31_536_000);
        assert_eq!(config.time_range_storage_key, "skh_analytics_range");
        assert_eq!(config.default_time_range, TimeRangeKey::Last30Days);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults are valid");
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("LOCALE_COOKIE_NAME", "LANG_PREF");
        std::env::set_var("LOCALE_COOKIE_MAX_AGE", "3600");
        std::env::set_var("DEFAULT_TIME_RANGE", "last_quarter");

        let config = Config::from_env().expect("valid overrides");
        assert_eq!(config.locale_cookie_name, "LANG_PREF");
        assert_eq!(config.cookie_max_age_secs, 3600);
        assert_eq!(config.default_time_range, TimeRangeKey::LastQuarter);
        assert_eq!(config.locale_storage_key, "app_locale");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_bad_max_age_uses_default() {
        clear_env();
        std::env::set_var("LOCALE_COOKIE_MAX_AGE", "forever");

        let config = Config::from_env().expect("numeric fields default silently");
        assert_eq!(config.cookie_max_age_secs, 31_536_000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_time_range() {
        clear_env();
        std::env::set_var("DEFAULT_TIME_RANGE", "last_week");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("DEFAULT_TIME_RANGE"));

        clear_env();
    }
}
