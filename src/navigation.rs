//! Navigation guard: render-or-redirect decisions for locale-prefixed routes.
//!
//! Every in-app URL is `/{locale}/{sub-path}`. The guard inspects one
//! navigation attempt and returns a [`NavigationDecision`]; the hosting UI
//! performs the actual navigation. Decisions are total: malformed paths fall
//! into the missing-locale branch and redirect.

use crate::i18n::{
    localized_url, strip_locale_prefix, LanguageNegotiator, LocaleResolver, LocaleStore,
    SupportedLocale,
};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;

/// Sub-path of the login screen.
pub const LOGIN_SEGMENT: &str = "login";

/// Sub-path authenticated users land on.
pub const DASHBOARD_SEGMENT: &str = "dashboard";

static LOCALE_LIKE_REGEX: OnceLock<Regex> = OnceLock::new();

fn locale_like_regex() -> &'static Regex {
    LOCALE_LIKE_REGEX
        .get_or_init(|| Regex::new(r"(?i)^[a-z]{2}(-[a-z]{2})?$").expect("valid regex"))
}

/// Receives the active locale whenever the guard settles on one.
pub trait TranslationSink {
    /// Switch translation lookups to `locale`.
    fn change_language(&self, locale: SupportedLocale);

    /// Update the document's `lang` attribute.
    fn set_document_lang(&self, _code: &str) {}
}

/// Sink for hosts without a translation layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslations;

impl TranslationSink for NoopTranslations {
    fn change_language(&self, _locale: SupportedLocale) {}
}

/// One navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationRequest {
    /// Path component, e.g. `/it/documents/7`
    pub path: String,
    /// Query string including `?`, or empty
    pub search: String,
    /// Fragment including `#`, or empty
    pub hash: String,
    pub authenticated: bool,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Split a location (`/en/docs?page=2#top`) into path, search and hash.
    pub fn from_location(location: &str) -> Self {
        let (before_hash, hash) = match location.find('#') {
            Some(index) => location.split_at(index),
            None => (location, ""),
        };
        let (path, search) = match before_hash.find('?') {
            Some(index) => before_hash.split_at(index),
            None => (before_hash, ""),
        };
        Self {
            path: path.to_string(),
            search: search.to_string(),
            hash: hash.to_string(),
            authenticated: false,
        }
    }

    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }
}

/// What the guarded route renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum RouteTarget {
    Login,
    /// Any authenticated page, identified by its locale-free path
    Page(String),
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Render {
        locale: SupportedLocale,
        target: RouteTarget,
    },
    RedirectTo {
        url: String,
        /// Replace the current history entry instead of pushing one
        replace: bool,
    },
}

impl NavigationDecision {
    fn replace_with(url: String) -> Self {
        NavigationDecision::RedirectTo { url, replace: true }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, NavigationDecision::RedirectTo { .. })
    }

    /// Target URL when this is a redirect.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            NavigationDecision::RedirectTo { url, .. } => Some(url),
            NavigationDecision::Render { .. } => None,
        }
    }
}

/// Decides render vs. redirect for each navigation attempt.
pub struct NavigationGuard<'a, S, N, T> {
    resolver: &'a LocaleResolver<S, N>,
    translations: &'a T,
}

impl<'a, S, N, T> NavigationGuard<'a, S, N, T>
where
    S: LocaleStore,
    N: LanguageNegotiator,
    T: TranslationSink,
{
    /// Guard resolving locales through `resolver` and reporting them to `translations`.
    pub fn new(resolver: &'a LocaleResolver<S, N>, translations: &'a T) -> Self {
        Self {
            resolver,
            translations,
        }
    }

    /// Decide how to handle `request`.
    ///
    /// A path without a supported locale segment redirects to the detected
    /// locale. A path with one persists that locale, propagates it to the
    /// translation sink, then applies the login/auth rules.
    pub fn decide(&self, request: &NavigationRequest) -> NavigationDecision {
        let stripped = strip_locale_prefix(&request.path);

        let Some(locale) = stripped.locale else {
            let detected = self.resolver.detect();
            let rest = rest_after_unsupported_segment(&request.path);
            let url = localized_url(detected, &rest, &request.search, &request.hash);
            debug!("No locale in {}, redirecting to {}", request.path, url);
            return NavigationDecision::replace_with(url);
        };

        self.enter_locale(locale);

        if !stripped.is_canonical() {
            let url = localized_url(locale, &stripped.rest_path, &request.search, &request.hash);
            debug!("Canonicalizing locale segment {} to {}", stripped.segment, url);
            return NavigationDecision::replace_with(url);
        }

        let sub_path = stripped.rest_path.trim_matches('/');
        let decision = match (sub_path, request.authenticated) {
            ("", _) => {
                NavigationDecision::replace_with(format!("/{}/{}", locale, DASHBOARD_SEGMENT))
            }
            (LOGIN_SEGMENT, true) => {
                NavigationDecision::replace_with(format!("/{}/{}", locale, DASHBOARD_SEGMENT))
            }
            (LOGIN_SEGMENT, false) => NavigationDecision::Render {
                locale,
                target: RouteTarget::Login,
            },
            (_, false) => {
                NavigationDecision::replace_with(format!("/{}/{}", locale, LOGIN_SEGMENT))
            }
            (_, true) => NavigationDecision::Render {
                locale,
                target: RouteTarget::Page(stripped.rest_path.clone()),
            },
        };

        debug!("Navigation to {} decided as {:?}", request.path, decision);
        decision
    }

    fn enter_locale(&self, locale: SupportedLocale) {
        self.resolver.persist(locale);
        self.translations.change_language(locale);
        self.translations.set_document_lang(locale.code());
    }
}

/// Rest path for a URL whose first segment is not a supported locale.
///
/// A locale-shaped first segment (`fr`, `de-AT`) is replaced when more
/// segments follow it; a lone segment and any other first segment are kept.
fn rest_after_unsupported_segment(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    let rest = match parts.split_first() {
        Some((first, tail)) if !tail.is_empty() && locale_like_regex().is_match(first) => tail,
        _ => &parts[..],
    };
    format!("/{}", rest.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{MemoryStore, StaticNegotiator};
    use std::cell::RefCell;

    const IT: SupportedLocale = SupportedLocale::Italian;

    #[derive(Default)]
    struct RecordingSink {
        languages: RefCell<Vec<SupportedLocale>>,
        document_langs: RefCell<Vec<String>>,
    }

    impl TranslationSink for RecordingSink {
        fn change_language(&self, locale: SupportedLocale) {
            self.languages.borrow_mut().push(locale);
        }

        fn set_document_lang(&self, code: &str) {
            self.document_langs.borrow_mut().push(code.to_string());
        }
    }

    fn resolver(negotiated: Option<&str>) -> LocaleResolver<MemoryStore, StaticNegotiator> {
        LocaleResolver::new(
            MemoryStore::new(),
            StaticNegotiator(negotiated.map(str::to_string)),
        )
    }

    fn redirect(url: &str) -> NavigationDecision {
        NavigationDecision::RedirectTo {
            url: url.to_string(),
            replace: true,
        }
    }

    // ==================== Missing Locale Tests ====================

    #[test]
    fn test_root_redirects_to_detected_locale() {
        let resolver = resolver(Some("it-IT"));
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        assert_eq!(guard.decide(&NavigationRequest::new("/")), redirect("/it"));
        assert_eq!(guard.decide(&NavigationRequest::new("")), redirect("/it"));
    }

    #[test]
    fn test_root_never_renders_even_when_authenticated() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let decision = guard.decide(&NavigationRequest::new("/").authenticated(true));
        assert_eq!(decision, redirect("/en"));
    }

    #[test]
    fn test_missing_locale_keeps_path_search_and_hash() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let request = NavigationRequest::from_location("/documents/7?tab=history#v2");
        assert_eq!(guard.decide(&request), redirect("/en/documents/7?tab=history#v2"));
    }

    #[test]
    fn test_unsupported_locale_segment_is_replaced() {
        let resolver = resolver(Some("it"));
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        assert_eq!(
            guard.decide(&NavigationRequest::new("/fr/documents")),
            redirect("/it/documents")
        );
        assert_eq!(
            guard.decide(&NavigationRequest::new("/de-AT/legal/templates")),
            redirect("/it/legal/templates")
        );
    }

    #[test]
    fn test_lone_unsupported_segment_is_kept() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        assert_eq!(guard.decide(&NavigationRequest::new("/fr")), redirect("/en/fr"));
    }

    #[test]
    fn test_missing_locale_does_not_persist_or_propagate() {
        let resolver = resolver(Some("it"));
        let sink = RecordingSink::default();
        let guard = NavigationGuard::new(&resolver, &sink);

        guard.decide(&NavigationRequest::new("/documents"));

        assert_eq!(resolver.persistence().read(), None);
        assert!(sink.languages.borrow().is_empty());
    }

    // ==================== Valid Locale Tests ====================

    #[test]
    fn test_index_redirects_to_dashboard() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        assert_eq!(guard.decide(&NavigationRequest::new("/it")), redirect("/it/dashboard"));
        assert_eq!(guard.decide(&NavigationRequest::new("/it/")), redirect("/it/dashboard"));
    }

    #[test]
    fn test_login_while_authenticated_redirects_to_dashboard() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let decision = guard.decide(&NavigationRequest::new("/en/login").authenticated(true));
        assert_eq!(decision, redirect("/en/dashboard"));
    }

    #[test]
    fn test_login_while_unauthenticated_renders_login() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let decision = guard.decide(&NavigationRequest::new("/it/login"));
        assert_eq!(
            decision,
            NavigationDecision::Render {
                locale: IT,
                target: RouteTarget::Login
            }
        );
        assert!(!decision.is_redirect());
    }

    #[test]
    fn test_protected_page_while_unauthenticated_redirects_to_login() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let decision = guard.decide(&NavigationRequest::new("/en/documents"));
        assert_eq!(decision, redirect("/en/login"));
        assert_eq!(decision.redirect_url(), Some("/en/login"));
    }

    #[test]
    fn test_protected_page_while_authenticated_renders() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let decision =
            guard.decide(&NavigationRequest::new("/it/documents/42").authenticated(true));
        assert_eq!(
            decision,
            NavigationDecision::Render {
                locale: IT,
                target: RouteTarget::Page("/documents/42".to_string())
            }
        );
    }

    #[test]
    fn test_non_canonical_segment_is_corrected() {
        let resolver = resolver(None);
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let request = NavigationRequest::from_location("/EN-us/documents?q=1#x").authenticated(true);
        assert_eq!(guard.decide(&request), redirect("/en/documents?q=1#x"));
        assert_eq!(guard.decide(&NavigationRequest::new("/IT")), redirect("/it"));
    }

    // ==================== Side Effect Tests ====================

    #[test]
    fn test_valid_locale_is_persisted_and_propagated() {
        let resolver = resolver(Some("en"));
        let sink = RecordingSink::default();
        let guard = NavigationGuard::new(&resolver, &sink);

        guard.decide(&NavigationRequest::new("/it/documents"));

        assert_eq!(resolver.persistence().read(), Some(IT));
        assert_eq!(*sink.languages.borrow(), vec![IT]);
        assert_eq!(*sink.document_langs.borrow(), vec!["it".to_string()]);
    }

    #[test]
    fn test_url_locale_becomes_default_for_root_visits() {
        let resolver = resolver(Some("en"));
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        assert_eq!(guard.decide(&NavigationRequest::new("/")), redirect("/en"));
        guard.decide(&NavigationRequest::new("/it/login"));
        assert_eq!(guard.decide(&NavigationRequest::new("/")), redirect("/it"));
    }

    #[test]
    fn test_redirect_chain_from_root_settles() {
        let resolver = resolver(Some("it"));
        let guard = NavigationGuard::new(&resolver, &NoopTranslations);

        let mut location = "/".to_string();
        let mut hops = 0;
        let decision = loop {
            let decision = guard.decide(&NavigationRequest::new(location.clone()));
            match decision.redirect_url() {
                Some(url) if hops < 5 => {
                    location = url.to_string();
                    hops += 1;
                }
                _ => break decision,
            }
        };

        // "/" -> "/it" -> "/it/dashboard" -> "/it/login"
        assert_eq!(hops, 3);
        assert_eq!(
            decision,
            NavigationDecision::Render {
                locale: IT,
                target: RouteTarget::Login
            }
        );
        assert_eq!(resolver.persistence().read(), Some(IT));
    }

    // ==================== Helper Tests ====================

    #[test]
    fn test_from_location() {
        let request = NavigationRequest::from_location("/en/docs?page=2#top");
        assert_eq!(request.path, "/en/docs");
        assert_eq!(request.search, "?page=2");
        assert_eq!(request.hash, "#top");

        let request = NavigationRequest::from_location("/en#a?b");
        assert_eq!(request.path, "/en");
        assert_eq!(request.search, "");
        assert_eq!(request.hash, "#a?b");
    }

    #[test]
    fn test_rest_after_unsupported_segment() {
        assert_eq!(rest_after_unsupported_segment("/"), "/");
        assert_eq!(rest_after_unsupported_segment("/documents"), "/documents");
        assert_eq!(rest_after_unsupported_segment("/fr/a/b"), "/a/b");
        assert_eq!(rest_after_unsupported_segment("/docs/a"), "/docs/a");
        assert_eq!(rest_after_unsupported_segment("/fr"), "/fr");
    }

    #[test]
    fn test_route_target_serializes() {
        let json = serde_json::to_value(RouteTarget::Page("/documents".to_string())).unwrap();
        assert_eq!(json["kind"], "page");
        assert_eq!(json["path"], "/documents");
    }
}
