//! Preview binary - resolves a navigation attempt and an analytics range without a browser
//!
//! Usage:
//!   cargo run --bin preview -- /documents                     # Redirect to the detected locale
//!   cargo run --bin preview -- /it/login --auth               # Authenticated visit to login
//!   cargo run --bin preview -- /en/dashboard --range last_quarter
//!   cargo run --bin preview -- / --cookie "APP_LOCALE=it"     # Simulate a persisted locale
//!
//! The negotiated language is the operating system's UI language.
//!
//! Optional environment variables:
//! - LOCALE_COOKIE_NAME (defaults to APP_LOCALE)
//! - LOCALE_STORAGE_KEY (defaults to app_locale)
//! - LOCALE_COOKIE_MAX_AGE (defaults to 31536000)
//! - TIME_RANGE_STORAGE_KEY (defaults to skh_analytics_range)
//! - DEFAULT_TIME_RANGE (defaults to last_30_days)

use anyhow::{Context, Result};
use locale_range_core::config::Config;
use locale_range_core::i18n::{LocaleResolver, MemoryStore, SysLocaleNegotiator};
use locale_range_core::navigation::{
    NavigationDecision, NavigationGuard, NavigationRequest, NoopTranslations,
};
use locale_range_core::time_range::{compute_time_range_localized, TimeRangePreference};
use serde_json::json;
use tracing::info;

struct PreviewArgs {
    location: String,
    authenticated: bool,
    range: Option<String>,
    cookie_header: Option<String>,
}

impl PreviewArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Self {
            location: "/".to_string(),
            authenticated: false,
            range: None,
            cookie_header: None,
        };

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--auth" => parsed.authenticated = true,
                "--range" => {
                    parsed.range = Some(iter.next().context("--range needs a value")?.clone())
                }
                "--cookie" => {
                    parsed.cookie_header =
                        Some(iter.next().context("--cookie needs a value")?.clone())
                }
                flag if flag.starts_with("--") => anyhow::bail!("Unknown flag: {}", flag),
                location => parsed.location = location.to_string(),
            }
        }

        Ok(parsed)
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_range_core=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let args = PreviewArgs::parse(&args)?;

    info!("Loading configuration...");
    let config = Config::from_env()?;

    let store = match &args.cookie_header {
        Some(header) => MemoryStore::from_cookie_header(header),
        None => MemoryStore::new(),
    };
    let resolver = LocaleResolver::with_config(&store, SysLocaleNegotiator, &config);

    let request =
        NavigationRequest::from_location(&args.location).authenticated(args.authenticated);
    let decision = NavigationGuard::new(&resolver, &NoopTranslations).decide(&request);

    let (navigation, locale) = match &decision {
        NavigationDecision::Render { locale, target } => {
            (json!({ "render": target, "locale": locale }), *locale)
        }
        NavigationDecision::RedirectTo { url, replace } => (
            json!({ "redirect": url, "replace": replace }),
            resolver.detect(),
        ),
    };
    info!("Navigation to {}: {:?}", args.location, decision);

    let preference = TimeRangePreference::new(&store, &config);
    let range_key = preference.initial(args.range.as_deref());
    let range = compute_time_range_localized(range_key, &chrono::Local::now(), locale);

    let accept_language = resolver
        .accept_language_header()
        .map(|(name, value)| format!("{}: {}", name, value));

    let output = json!({
        "navigation": navigation,
        "acceptLanguage": accept_language,
        "range": range,
        "query": range.query_params(),
        "cookies": store.cookie_header(),
        "metrics": resolver.metrics().report(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
