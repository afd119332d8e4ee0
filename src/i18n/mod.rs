//! Internationalization (i18n) support
//!
//! Bot replies, button labels and error descriptions are translation keys
//! resolved through `rust-i18n`. Supported languages: Russian (ru) and
//! English (en). The channel audience is Russian-speaking, so `ru` is the
//! configured default; `en` is the fallback for missing keys.
//!
//! # Environment Variables
//!
//! - `STOIK_LANG`: preferred language (ru, en).
//!
//! # Usage
//!
//! ```rust,ignore
//! use stoik::i18n::{t, set_locale};
//!
//! set_locale("ru");
//! let msg = t!("bot.post.success");
//! ```

use std::sync::RwLock;

// rust_i18n::i18n! is declared in lib.rs

static CURRENT_LOCALE: RwLock<String> = RwLock::new(String::new());

/// Locale used when nothing is configured
pub const DEFAULT_LOCALE: &str = "ru";

/// Set the current locale for translations
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    rust_i18n::set_locale(normalized);
    if let Ok(mut current) = CURRENT_LOCALE.write() {
        *current = normalized.to_string();
    }
}

/// Get the current locale
pub fn current_locale() -> String {
    CURRENT_LOCALE
        .read()
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.clone())
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Initialize i18n from `STOIK_LANG`, falling back to `default`
pub fn init_from_env(default: &str) {
    let locale = std::env::var("STOIK_LANG").unwrap_or_else(|_| default.to_string());
    set_locale(&locale);
}

/// Normalize locale code to a supported one
///
/// - ru-RU, ru_RU, russian -> ru
/// - anything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("ru") || lower == "russian" {
        "ru"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// Re-export of `rust_i18n::t!`.
///
/// ```rust,ignore
/// use stoik::i18n::t;
///
/// let msg = t!("bot.schedule.current", times = "09:00, 18:00", zone = "МСК");
/// ```
#[doc(inline)]
pub use rust_i18n::t;
