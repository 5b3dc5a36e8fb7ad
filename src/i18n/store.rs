//! Storage capability for locale and range preferences.
//!
//! The dashboard keeps preferences in two channels: a durable cookie that is
//! visible to requests, and a client-only key/value store. Both are fallible
//! and are injected through [`LocaleStore`] so resolution logic can run
//! against [`MemoryStore`] in tests and tools.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Bytes escaped in cookie values; everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Failure reported by a storage channel.
///
/// Callers in this crate never propagate these; they degrade to "value absent".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// `SameSite` attribute for the durable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        };
        f.write_str(value)
    }
}

/// Attributes written alongside a durable-channel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age_secs: u64,
    pub path: String,
    pub same_site: SameSite,
}

impl CookieOptions {
    /// Whole-application path and `SameSite=Lax` with the given lifetime.
    pub fn long_lived(max_age_secs: u64) -> Self {
        Self {
            max_age_secs,
            path: "/".to_string(),
            same_site: SameSite::Lax,
        }
    }

    /// Render a `Set-Cookie` style assignment for `name=value`.
    ///
    /// The value is percent-encoded.
    pub fn to_set_cookie(&self, name: &str, value: &str) -> String {
        format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            name,
            encode_cookie_value(value),
            self.path,
            self.max_age_secs,
            self.same_site
        )
    }
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self::long_lived(31_536_000)
    }
}

/// Split a `Cookie:` request header into decoded `(name, value)` pairs.
///
/// Pairs are split on `;` and each pair on its first `=`. A bare name has an
/// empty value. Values are percent-decoded; invalid UTF-8 is replaced.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, String)> {
    header
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            (name.trim(), decode_cookie_value(value.trim()))
        })
}

/// Find a cookie value in a `Cookie:` request header; the first match wins.
pub fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    cookie_pairs(header).find_map(|(key, value)| (key == name).then_some(value))
}

fn encode_cookie_value(value: &str) -> String {
    utf8_percent_encode(value, COOKIE_VALUE).to_string()
}

fn decode_cookie_value(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Key/value capability backing both persistence channels.
///
/// Item methods model the client-only channel, cookie methods the durable
/// channel. Every method may fail.
pub trait LocaleStore {
    /// Read a client-only item.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a client-only item.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read a durable cookie value.
    fn get_cookie(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Write a durable cookie value.
    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), StorageError>;
}

impl<S: LocaleStore + ?Sized> LocaleStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn get_cookie(&self, name: &str) -> Result<Option<String>, StorageError> {
        (**self).get_cookie(name)
    }

    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), StorageError> {
        (**self).set_cookie(name, value, options)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<String, String>,
    cookies: HashMap<String, (String, CookieOptions)>,
    items_unavailable: bool,
    cookies_unavailable: bool,
    items_full: bool,
}

/// In-memory store with switchable failure modes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store with both channels available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the durable channel from a `Cookie:` request header.
    pub fn from_cookie_header(header: &str) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for (name, value) in cookie_pairs(header) {
                state
                    .cookies
                    .entry(name.to_string())
                    .or_insert_with(|| (value, CookieOptions::default()));
            }
        }
        store
    }

    /// Make every client-only read and write fail.
    pub fn set_items_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.items_unavailable = unavailable;
        }
    }

    /// Make every durable read and write fail.
    pub fn set_cookies_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.cookies_unavailable = unavailable;
        }
    }

    /// Make client-only writes fail with `QuotaExceeded`.
    pub fn set_items_full(&self, full: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.items_full = full;
        }
    }

    /// Attributes of the last write to a cookie.
    pub fn cookie_options(&self, name: &str) -> Option<CookieOptions> {
        let state = self.state.lock().ok()?;
        state.cookies.get(name).map(|(_, options)| options.clone())
    }

    /// Render the durable channel as a `Cookie:` request header.
    pub fn cookie_header(&self) -> String {
        let Ok(state) = self.state.lock() else {
            return String::new();
        };
        let mut pairs: Vec<String> = state
            .cookies
            .iter()
            .map(|(name, (value, _))| format!("{}={}", name, encode_cookie_value(value)))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }
}

impl LocaleStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        if state.items_unavailable {
            return Err(StorageError::Unavailable("item storage disabled".to_string()));
        }
        Ok(state.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        if state.items_unavailable {
            return Err(StorageError::Unavailable("item storage disabled".to_string()));
        }
        if state.items_full {
            return Err(StorageError::QuotaExceeded);
        }
        state.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_cookie(&self, name: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        if state.cookies_unavailable {
            return Err(StorageError::Unavailable("cookies disabled".to_string()));
        }
        Ok(state.cookies.get(name).map(|(value, _)| value.clone()))
    }

    fn set_cookie(
        &self,
        name: &str,
        value: &str,
        options: &CookieOptions,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().map_err(|_| StorageError::Poisoned)?;
        if state.cookies_unavailable {
            return Err(StorageError::Unavailable("cookies disabled".to_string()));
        }
        state
            .cookies
            .insert(name.to_string(), (value.to_string(), options.clone()));
        Ok(())
    }
}
