//! Supported locale type and tag normalization.
//!
//! `SupportedLocale` is the closed set of UI languages the dashboard ships.
//! Free-text language tags (browser-reported languages, cookie values, URL
//! segments) are funnelled through [`normalize`], which either maps them to
//! one of the supported codes or returns `None`.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Locale used when neither storage nor negotiation yields a supported one.
pub const DEFAULT_LOCALE: SupportedLocale = SupportedLocale::English;

/// A UI language the dashboard can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedLocale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "it")]
    Italian,
}

/// Error returned by the strict [`SupportedLocale::from_str`] parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported locale code: '{0}'")]
pub struct ParseLocaleError(pub String);

impl SupportedLocale {
    /// All supported locales, in registry order.
    pub const ALL: [SupportedLocale; 2] = [SupportedLocale::English, SupportedLocale::Italian];

    /// Two-letter code used in URLs, cookies and the `Accept-Language` header.
    pub fn code(&self) -> &'static str {
        match self {
            SupportedLocale::English => "en",
            SupportedLocale::Italian => "it",
        }
    }

    /// Get the full locale configuration from the registry.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get().config_for(*self)
    }

    /// English name of the locale (e.g., "Italian").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Name of the locale in its own language (e.g., "Italiano").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Whether this is the hard-coded fallback locale.
    pub fn is_default(&self) -> bool {
        *self == DEFAULT_LOCALE
    }
}

impl fmt::Display for SupportedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SupportedLocale {
    type Err = ParseLocaleError;

    /// Strict parse: only the exact canonical codes are accepted.
    ///
    /// Use [`normalize`] for free-text tags such as `en-US`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SupportedLocale::ALL
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| ParseLocaleError(s.to_string()))
    }
}

/// Normalize a free-text language tag into a supported locale.
///
/// The tag is lower-cased and only the primary subtag (the part before the
/// first `-`) is consulted, so `en-GB` and `EN` both map to English. Empty,
/// missing and unrecognized tags yield `None`; this never fails.
pub fn normalize(raw: Option<&str>) -> Option<SupportedLocale> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    let lower = raw.to_lowercase();
    let primary = lower.split('-').next().unwrap_or_default();
    LocaleRegistry::get().locale_for_code(primary)
}
