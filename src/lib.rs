//! Locale resolution, localized routing decisions and named analytics time
//! ranges for the dashboard frontend.
//!
//! - [`i18n`] detects, normalizes and persists the UI locale and rewrites
//!   paths under a `/{locale}` prefix.
//! - [`navigation`] decides whether a navigation attempt renders or redirects.
//! - [`time_range`] resolves range keys such as `last_quarter` to concrete,
//!   offset-aware instants.

pub mod config;
pub mod i18n;
pub mod navigation;
pub mod time_range;
