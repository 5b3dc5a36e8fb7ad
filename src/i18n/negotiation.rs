//! Negotiated language sources.
//!
//! A negotiator reports the language the runtime would pick on its own (the
//! browser's `navigator.language`, the operating system's UI language, ...).
//! It is consulted only after persisted preferences.

/// Best-effort source of the runtime's preferred language tag.
pub trait LanguageNegotiator {
    /// Return the preferred BCP 47 tag (e.g. `it-IT`) when available.
    fn negotiated_language(&self) -> Option<String>;
}

/// Negotiator returning a fixed tag, for tests and hosts that already know it.
#[derive(Debug, Clone, Default)]
pub struct StaticNegotiator(pub Option<String>);

impl StaticNegotiator {
    /// Negotiator that always reports `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Some(tag.into()))
    }

    /// Negotiator that never reports a language.
    pub fn none() -> Self {
        Self(None)
    }
}

impl LanguageNegotiator for StaticNegotiator {
    fn negotiated_language(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Negotiator backed by the host's locale settings via `sys-locale`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SysLocaleNegotiator;

impl LanguageNegotiator for SysLocaleNegotiator {
    fn negotiated_language(&self) -> Option<String> {
        sys_locale::get_locale()
    }
}
