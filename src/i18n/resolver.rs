//! Effective-locale resolution and locale-prefixed URL paths.
//!
//! `LocaleResolver::detect` is the single answer to "which locale would a
//! fresh session use". The path helpers are pure and keep two properties:
//! prefixing a locale-free absolute path and stripping it again yields the
//! original path, and prefixing twice equals prefixing once.

use crate::config::Config;
use crate::i18n::{
    normalize, LanguageNegotiator, LocalePersistence, LocaleStore, ResolutionMetrics,
    SupportedLocale, DEFAULT_LOCALE,
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Request header carrying the persisted locale to the API.
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";

static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();

fn scheme_regex() -> &'static Regex {
    SCHEME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid regex"))
}

/// A path split into its locale segment and the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedPath {
    /// Locale named by the first segment, if it normalizes
    pub locale: Option<SupportedLocale>,

    /// The first segment exactly as written (empty for `/`)
    pub segment: String,

    /// Remainder after a recognized locale segment, or the whole path
    /// otherwise; always starts with `/`
    pub rest_path: String,
}

impl StrippedPath {
    /// Whether the locale segment is spelled exactly as the canonical code.
    pub fn is_canonical(&self) -> bool {
        self.locale
            .is_some_and(|locale| locale.code() == self.segment)
    }
}

/// Split a path into its first `/`-delimited segment and the remainder.
///
/// Leading slashes are skipped when locating the first segment. When that
/// segment normalizes to a supported locale, the remainder after it is
/// returned verbatim (an empty remainder becomes `/`). Otherwise `locale` is
/// `None` and `rest_path` is the whole path, made absolute if needed.
pub fn strip_locale_prefix(path: &str) -> StrippedPath {
    let trimmed = path.trim_start_matches('/');
    let (segment, remainder) = match trimmed.find('/') {
        Some(index) => trimmed.split_at(index),
        None => (trimmed, ""),
    };

    match normalize(Some(segment)) {
        Some(locale) => StrippedPath {
            locale: Some(locale),
            segment: segment.to_string(),
            rest_path: if remainder.is_empty() {
                "/".to_string()
            } else {
                remainder.to_string()
            },
        },
        None => StrippedPath {
            locale: None,
            segment: segment.to_string(),
            rest_path: if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            },
        },
    }
}

/// Insert a locale segment into an in-app target.
///
/// External URLs (a scheme or `//`) pass through untouched, as do absolute
/// paths that already carry a recognized locale segment.
pub fn with_locale_prefix(locale: SupportedLocale, to: &str) -> String {
    if to.is_empty() {
        return format!("/{}", locale);
    }
    if to.starts_with("//") || scheme_regex().is_match(to) {
        return to.to_string();
    }
    if !to.starts_with('/') {
        return format!("/{}/{}", locale, to);
    }
    if strip_locale_prefix(to).locale.is_some() {
        return to.to_string();
    }
    if to == "/" {
        return format!("/{}", locale);
    }
    format!("/{}{}", locale, to)
}

/// Build `/{locale}{rest}{search}{hash}`, dropping a bare `/` rest path.
pub fn localized_url(locale: SupportedLocale, rest_path: &str, search: &str, hash: &str) -> String {
    let rest = if rest_path == "/" { "" } else { rest_path };
    format!("/{}{}{}{}", locale, rest, search, hash)
}

/// Combines persisted preferences, runtime negotiation and the default locale.
#[derive(Debug)]
pub struct LocaleResolver<S, N> {
    persistence: LocalePersistence<S>,
    negotiator: N,
}

impl<S: LocaleStore, N: LanguageNegotiator> LocaleResolver<S, N> {
    /// Create a resolver with the default key names and cookie lifetime.
    pub fn new(store: S, negotiator: N) -> Self {
        Self {
            persistence: LocalePersistence::new(store),
            negotiator,
        }
    }

    /// Create a resolver using configured key names and cookie lifetime.
    pub fn with_config(store: S, negotiator: N, config: &Config) -> Self {
        Self {
            persistence: LocalePersistence::with_config(store, config),
            negotiator,
        }
    }

    /// Decide the locale a fresh session should use.
    ///
    /// Precedence: persisted preference, then the negotiated language, then
    /// the default locale. Always returns a value.
    pub fn detect(&self) -> SupportedLocale {
        let metrics = self.metrics();

        if let Some(locale) = self.persistence.read() {
            debug!("Detected locale {} from persisted preference", locale);
            metrics.record_persisted_hit();
            return locale;
        }

        let negotiated = self.negotiator.negotiated_language();
        if let Some(locale) = normalize(negotiated.as_deref()) {
            debug!("Detected locale {} from negotiated language {:?}", locale, negotiated);
            metrics.record_negotiated_hit();
            return locale;
        }

        debug!("No usable locale preference, using default {}", DEFAULT_LOCALE);
        metrics.record_default_fallback();
        DEFAULT_LOCALE
    }

    /// Locale to send to the API, if the user has a persisted preference.
    ///
    /// Negotiated and default locales are never sent.
    pub fn accept_language(&self) -> Option<SupportedLocale> {
        self.persistence.read()
    }

    /// `(header name, value)` pair for the API client, if any.
    pub fn accept_language_header(&self) -> Option<(&'static str, &'static str)> {
        self.accept_language()
            .map(|locale| (ACCEPT_LANGUAGE_HEADER, locale.code()))
    }

    /// Remember an explicit or URL-derived locale choice.
    pub fn persist(&self, locale: SupportedLocale) {
        self.persistence.write(locale);
    }

    /// Switch the UI language from the page at `current_path`.
    ///
    /// Returns the URL to navigate to (pushing a history entry), or `None`
    /// when `next` is already the active locale. The choice is persisted
    /// before returning.
    pub fn switch_locale(
        &self,
        next: SupportedLocale,
        current_path: &str,
        search: &str,
        hash: &str,
    ) -> Option<String> {
        let stripped = strip_locale_prefix(current_path);
        if stripped.locale.unwrap_or(DEFAULT_LOCALE) == next {
            return None;
        }

        self.persist(next);
        debug!("Switching locale to {} from {}", next, current_path);
        Some(localized_url(next, &stripped.rest_path, search, hash))
    }

    /// The persistence layer backing [`detect`](Self::detect).
    pub fn persistence(&self) -> &LocalePersistence<S> {
        &self.persistence
    }

    /// Which precedence source answered each detection.
    pub fn metrics(&self) -> &ResolutionMetrics {
        self.persistence.metrics()
    }
}
