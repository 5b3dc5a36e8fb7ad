//! Locale registry: single source of truth for locale metadata.
//!
//! The set of locales is closed (see [`SupportedLocale`]); the registry only
//! carries the metadata attached to each one and answers code lookups for
//! tag normalization. It is initialised once with `OnceLock` and immutable
//! thereafter.

use crate::i18n::{SupportedLocale, DEFAULT_LOCALE};
use std::sync::OnceLock;

/// Metadata for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// The locale this entry describes
    pub locale: SupportedLocale,

    /// ISO 639-1 language code (e.g., "en", "it")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Italian")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Italiano")
    pub native_name: &'static str,
}

const ENGLISH_CONFIG: LocaleConfig = LocaleConfig {
    locale: SupportedLocale::English,
    code: "en",
    name: "English",
    native_name: "English",
};

const ITALIAN_CONFIG: LocaleConfig = LocaleConfig {
    locale: SupportedLocale::Italian,
    code: "it",
    name: "Italian",
    native_name: "Italiano",
};

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: vec![ENGLISH_CONFIG, ITALIAN_CONFIG],
        })
    }

    /// Get the metadata for a supported locale.
    pub fn config_for(&self, locale: SupportedLocale) -> &LocaleConfig {
        match locale {
            SupportedLocale::English => &self.locales[0],
            SupportedLocale::Italian => &self.locales[1],
        }
    }

    /// Get a locale configuration by its exact code.
    ///
    /// # Returns
    /// * `Some(&LocaleConfig)` if the code is registered
    /// * `None` otherwise (lookups are case-sensitive)
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|config| config.code == code)
    }

    /// Resolve an exact code to a supported locale.
    pub fn locale_for_code(&self, code: &str) -> Option<SupportedLocale> {
        self.get_by_code(code).map(|config| config.locale)
    }

    /// Metadata of the fallback locale ([`DEFAULT_LOCALE`]).
    pub fn default_config(&self) -> &LocaleConfig {
        self.config_for(DEFAULT_LOCALE)
    }

    /// Get all locales, in display order.
    pub fn list(&self) -> &[LocaleConfig] {
        &self.locales
    }
}
