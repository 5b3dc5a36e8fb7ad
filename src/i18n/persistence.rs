//! Locale preference persistence across the durable and client-only channels.
//!
//! Reads prefer the durable cookie, then the client-only item. Every value is
//! passed through [`normalize`] so stale or corrupted entries degrade to
//! `None`. Storage errors are logged and swallowed; neither `read` nor
//! `write` can fail.

use crate::config::Config;
use crate::i18n::{normalize, CookieOptions, LocaleStore, ResolutionMetrics, SupportedLocale};
use tracing::{debug, warn};

/// Fixed durable-channel key for the locale preference.
pub const LOCALE_COOKIE_KEY: &str = "APP_LOCALE";

/// Fixed client-only key for the locale preference.
pub const LOCALE_STORAGE_KEY: &str = "app_locale";

/// Reads and writes the locale preference through an injected store.
#[derive(Debug)]
pub struct LocalePersistence<S> {
    store: S,
    cookie_name: String,
    storage_key: String,
    cookie_options: CookieOptions,
    metrics: ResolutionMetrics,
}

impl<S: LocaleStore> LocalePersistence<S> {
    /// Create a persistence layer with the default key names and cookie lifetime.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &Config::default())
    }

    /// Create a persistence layer using configured key names.
    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store,
            cookie_name: config.locale_cookie_name.clone(),
            storage_key: config.locale_storage_key.clone(),
            cookie_options: CookieOptions::long_lived(config.cookie_max_age_secs),
            metrics: ResolutionMetrics::new(),
        }
    }

    /// Read the persisted locale, durable channel first.
    pub fn read(&self) -> Option<SupportedLocale> {
        let from_cookie = match self.store.get_cookie(&self.cookie_name) {
            Ok(value) => normalize(value.as_deref()),
            Err(e) => {
                warn!("Ignoring unreadable locale cookie {}: {}", self.cookie_name, e);
                self.metrics.record_storage_failure();
                None
            }
        };
        if let Some(locale) = from_cookie {
            debug!("Persisted locale {} read from cookie", locale);
            return Some(locale);
        }

        match self.store.get_item(&self.storage_key) {
            Ok(value) => {
                let locale = normalize(value.as_deref());
                if let Some(locale) = locale {
                    debug!("Persisted locale {} read from storage", locale);
                }
                locale
            }
            Err(e) => {
                warn!("Ignoring unreadable locale item {}: {}", self.storage_key, e);
                self.metrics.record_storage_failure();
                None
            }
        }
    }

    /// Persist a locale to both channels.
    ///
    /// The client-only write is best-effort; the durable write is always
    /// attempted afterwards. Failures on either channel are swallowed.
    pub fn write(&self, locale: SupportedLocale) {
        if let Err(e) = self.store.set_item(&self.storage_key, locale.code()) {
            warn!("Failed to store locale {} in {}: {}", locale, self.storage_key, e);
            self.metrics.record_storage_failure();
        }

        if let Err(e) = self
            .store
            .set_cookie(&self.cookie_name, locale.code(), &self.cookie_options)
        {
            warn!("Failed to set locale cookie {}: {}", self.cookie_name, e);
            self.metrics.record_storage_failure();
        }
    }

    /// `Set-Cookie` value a server would send to persist `locale`.
    pub fn set_cookie_header(&self, locale: SupportedLocale) -> String {
        self.cookie_options
            .to_set_cookie(&self.cookie_name, locale.code())
    }

    /// Attributes used for durable-channel writes.
    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie_options
    }

    /// Counters shared with the owning resolver.
    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    /// The injected store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::MemoryStore;

    fn seeded(cookie: Option<&str>, item: Option<&str>) -> MemoryStore {
        let store = MemoryStore::new();
        if let Some(value) = cookie {
            store
                .set_cookie(LOCALE_COOKIE_KEY, value, &CookieOptions::default())
                .unwrap();
        }
        if let Some(value) = item {
            store.set_item(LOCALE_STORAGE_KEY, value).unwrap();
        }
        store
    }

    // ==================== read Tests ====================

    #[test]
    fn test_read_empty_store() {
        let persistence = LocalePersistence::new(MemoryStore::new());
        assert_eq!(persistence.read(), None);
    }

    #[test]
    fn test_read_cookie_wins_over_item() {
        let persistence = LocalePersistence::new(seeded(Some("it"), Some("en")));
        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
    }

    #[test]
    fn test_read_falls_back_to_item() {
        let persistence = LocalePersistence::new(seeded(None, Some("it")));
        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
    }

    #[test]
    fn test_read_percent_encoded_cookie_header() {
        let persistence =
            LocalePersistence::new(MemoryStore::from_cookie_header("APP_LOCALE=it%2DIT"));
        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
    }

    #[test]
    fn test_read_unparseable_cookie_falls_back_to_item() {
        let persistence = LocalePersistence::new(seeded(Some("klingon"), Some("it-IT")));
        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
    }

    #[test]
    fn test_read_corrupted_values_degrade_to_none() {
        let persistence = LocalePersistence::new(seeded(Some("{\"x\":1}"), Some("")));
        assert_eq!(persistence.read(), None);
    }

    #[test]
    fn test_read_cookie_failure_falls_back_to_item() {
        let store = seeded(Some("en"), Some("it"));
        store.set_cookies_unavailable(true);
        let persistence = LocalePersistence::new(store);

        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
        assert_eq!(persistence.metrics().storage_failures(), 1);
    }

    #[test]
    fn test_read_both_channels_failing() {
        let store = seeded(Some("en"), Some("it"));
        store.set_cookies_unavailable(true);
        store.set_items_unavailable(true);
        let persistence = LocalePersistence::new(store);

        assert_eq!(persistence.read(), None);
        assert_eq!(persistence.metrics().storage_failures(), 2);
    }

    // ==================== write Tests ====================

    #[test]
    fn test_write_then_read_observes_value() {
        let persistence = LocalePersistence::new(seeded(Some("en"), Some("en")));
        persistence.write(SupportedLocale::Italian);
        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
    }

    #[test]
    fn test_write_sets_both_channels() {
        let persistence = LocalePersistence::new(MemoryStore::new());
        persistence.write(SupportedLocale::Italian);

        let store = persistence.store();
        assert_eq!(store.get_item(LOCALE_STORAGE_KEY).unwrap(), Some("it".to_string()));
        assert_eq!(store.get_cookie(LOCALE_COOKIE_KEY).unwrap(), Some("it".to_string()));
    }

    #[test]
    fn test_write_cookie_is_long_lived_and_app_wide() {
        let persistence = LocalePersistence::new(MemoryStore::new());
        persistence.write(SupportedLocale::English);

        let options = persistence.store().cookie_options(LOCALE_COOKIE_KEY).unwrap();
        assert_eq!(options.max_age_secs, 31_536_000);
        assert_eq!(options.path, "/");
    }

    #[test]
    fn test_write_quota_exceeded_still_sets_cookie() {
        let store = MemoryStore::new();
        store.set_items_full(true);
        let persistence = LocalePersistence::new(store);

        persistence.write(SupportedLocale::Italian);

        assert_eq!(persistence.read(), Some(SupportedLocale::Italian));
        assert_eq!(persistence.metrics().storage_failures(), 1);
    }

    #[test]
    fn test_write_with_everything_unavailable_does_not_fail() {
        let store = MemoryStore::new();
        store.set_items_unavailable(true);
        store.set_cookies_unavailable(true);
        let persistence = LocalePersistence::new(store);

        persistence.write(SupportedLocale::Italian);
        assert_eq!(persistence.metrics().storage_failures(), 2);
    }

    // ==================== Config Tests ====================

    #[test]
    fn test_custom_key_names() {
        let config = Config {
            locale_cookie_name: "LANG_PREF".to_string(),
            locale_storage_key: "lang_pref".to_string(),
            cookie_max_age_secs: 3600,
            ..Config::default()
        };
        let persistence = LocalePersistence::with_config(MemoryStore::new(), &config);
        persistence.write(SupportedLocale::Italian);

        let store = persistence.store();
        assert_eq!(store.get_cookie("LANG_PREF").unwrap(), Some("it".to_string()));
        assert_eq!(store.get_item("lang_pref").unwrap(), Some("it".to_string()));
        assert_eq!(store.get_cookie(LOCALE_COOKIE_KEY).unwrap(), None);
        assert_eq!(
            persistence.set_cookie_header(SupportedLocale::Italian),
            "LANG_PREF=it; Path=/; Max-Age=3600; SameSite=Lax"
        );
    }
}
