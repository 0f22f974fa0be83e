//! Per-request display preferences carried in cookies.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use serde::Serialize;

/// Locales the gateway ships translations for.
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh"];

const DEFAULT_LOCALE: &str = "en";
const DEFAULT_THEME: &str = "system";

/// Locale and theme resolved from the `lang` and `theme` cookies.
/// Unknown or missing values fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub locale: String,
    pub theme: String,
}

impl Preferences {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers.get(COOKIE).and_then(|v| v.to_str().ok()).unwrap_or("");
        let locale = cookie_value(cookies, "lang")
            .filter(|lang| SUPPORTED_LOCALES.contains(&lang.as_str()))
            .unwrap_or_else(|| DEFAULT_LOCALE.to_owned());
        let theme =
            cookie_value(cookies, "theme").unwrap_or_else(|| DEFAULT_THEME.to_owned());
        Self { locale, theme }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self { locale: DEFAULT_LOCALE.to_owned(), theme: DEFAULT_THEME.to_owned() }
    }
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == name && !v.trim().is_empty()).then(|| v.trim().to_owned())
    })
}
