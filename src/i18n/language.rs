//! Language type: a code that has been checked against the registry.

use crate::error::{AdminError, Result};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use std::fmt;

/// A supported language.
///
/// Only constructible from codes present in the registry, so any `Language`
/// handed to the content merger is one this client is allowed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "de")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const GERMAN: Language = Language { code: "de" };
    pub const SPANISH: Language = Language { code: "es" };

    /// Create a Language from a language code string.
    ///
    /// # Errors
    /// Returns `AdminError::UnsupportedLanguage` if the code is not in the
    /// registry.
    pub fn from_code(code: &str) -> Result<Language> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| AdminError::UnsupportedLanguage(code.to_string()))
    }

    /// The fallback editing language (first registry entry).
    pub fn fallback() -> Language {
        Language {
            code: LanguageRegistry::get().fallback().code,
        }
    }

    /// Every supported language in display order.
    pub fn all() -> impl Iterator<Item = Language> {
        LanguageRegistry::get()
            .list()
            .iter()
            .map(|config| Language { code: config.code })
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_rtl(&self) -> bool {
        self.config().is_rtl
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
