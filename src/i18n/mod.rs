//! Internationalization (i18n) module: locale codec, persistence and resolution.
//!
//! # Architecture
//!
//! - `locale`: `SupportedLocale` and tag normalization
//! - `registry`: Single source of truth for locale metadata
//! - `strings`: Localized range labels and short-date month names
//! - `store`: Injected storage capability for the cookie and client-only channels
//! - `persistence`: Reads and writes the locale preference with channel precedence
//! - `negotiation`: Runtime-reported language sources
//! - `resolver`: Effective-locale decision and locale-prefixed paths
//! - `metrics`: Which precedence source answered, and swallowed storage errors
//!
//! # Example
//!
//! ```rust
//! use locale_range_core::i18n::{
//!     with_locale_prefix, LocaleResolver, MemoryStore, StaticNegotiator, SupportedLocale,
//! };
//!
//! let resolver = LocaleResolver::new(MemoryStore::new(), StaticNegotiator::new("it-IT"));
//! let locale = resolver.detect();
//! assert_eq!(locale, SupportedLocale::Italian);
//! assert_eq!(with_locale_prefix(locale, "/documents"), "/it/documents");
//! ```

mod locale;
mod metrics;
mod negotiation;
mod persistence;
mod registry;
mod resolver;
mod store;
mod strings;

pub use locale::{normalize, ParseLocaleError, SupportedLocale, DEFAULT_LOCALE};
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use negotiation::{LanguageNegotiator, StaticNegotiator, SysLocaleNegotiator};
pub use persistence::{LocalePersistence, LOCALE_COOKIE_KEY, LOCALE_STORAGE_KEY};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use resolver::{
    localized_url, strip_locale_prefix, with_locale_prefix, LocaleResolver, StrippedPath,
    ACCEPT_LANGUAGE_HEADER,
};
pub use store::{
    cookie_pairs, parse_cookie_header, CookieOptions, LocaleStore, MemoryStore, SameSite,
    StorageError,
};
pub use strings::{LocaleStrings, ENGLISH_STRINGS, ITALIAN_STRINGS};
