//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is a fixed, ordered table. Its order is the order in which
//! languages are offered by a language selector, and exactly one entry is the
//! default language that every fallback chain ends in.

use std::sync::OnceLock;

/// Code of the default language.
///
/// This language must always have an embedded fallback bundle, see
/// [`crate::i18n::FallbackTable::embedded`].
pub const DEFAULT_LANGUAGE: &str = "da";

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "da", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "Danish", "Swedish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Dansk", "Svenska")
    pub native_name: &'static str,

    /// Whether this is the default language (exactly one should be true)
    pub is_default: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language is supported
    /// * `None` otherwise
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in selector order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// All supported language codes, in selector order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.languages.iter().map(|lang| lang.code).collect()
    }

    /// Get the default language configuration, if the table contains it.
    pub fn default_language(&self) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.is_default)
    }

    /// Check if a language code is in the supported table.
    pub fn is_available(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn supported_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: DEFAULT_LANGUAGE,
            name: "Danish",
            native_name: "Dansk",
            is_default: true,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: false,
        },
        LanguageConfig {
            code: "sv",
            name: "Swedish",
            native_name: "Svenska",
            is_default: false,
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_default: false,
        },
    ]
}
