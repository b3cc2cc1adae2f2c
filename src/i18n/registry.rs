//! Language registry: the closed, ordered set of languages articles can carry.
//!
//! Every language code this client produces comes from here. Records coming
//! back from the server may hold other keys; those are carried through
//! untouched but can never be selected for editing.

use std::sync::OnceLock;

/// Metadata for one supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "de")
    pub code: &'static str,

    /// English name of the language, as shown in selectors
    pub name: &'static str,

    /// Native name of the language (e.g., "Deutsch", "Español")
    pub native_name: &'static str,

    /// Whether text in this language is written right-to-left
    pub is_rtl: bool,
}

/// Ordered registry of supported languages.
///
/// Order matters: the first entry is the fallback editing language when a
/// record gives no usable hint.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in display order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// The first supported language.
    pub fn fallback(&self) -> &LanguageConfig {
        &self.languages[0]
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// Display name for a code, falling back to the raw code for keys
    /// outside the registry.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get_by_code(code).map(|lang| lang.name).unwrap_or(code)
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_rtl: false,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_rtl: false,
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_rtl: false,
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_rtl: false,
        },
        LanguageConfig {
            code: "it",
            name: "Italian",
            native_name: "Italiano",
            is_rtl: false,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_rtl: false,
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_rtl: true,
        },
        LanguageConfig {
            code: "tr",
            name: "Turkish",
            native_name: "Türkçe",
            is_rtl: false,
        },
    ]
}
