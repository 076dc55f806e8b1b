//! Language type: validated representation of a supported language.
//!
//! Resolution entry points accept raw codes so that unsupported codes can
//! degrade through the fallback chain. `Language` is for the places where a
//! code must come from the supported table, such as selector enumeration.

use crate::i18n::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE};
use anyhow::{bail, Result};
use std::fmt;

/// A language from the supported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "da", "en")
    code: &'static str,
}

impl Language {
    pub const DANISH: Language = Language { code: "da" };
    pub const ENGLISH: Language = Language { code: "en" };
    pub const SWEDISH: Language = Language { code: "sv" };
    pub const GERMAN: Language = Language { code: "de" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the supported table
    /// * `Err` for any other code
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The default language.
    pub fn default_language() -> Language {
        Language {
            code: DEFAULT_LANGUAGE,
        }
    }

    /// Every supported language, in selector order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .codes()
            .into_iter()
            .map(|code| Language { code })
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the registry entry for this language.
    ///
    /// Returns `None` only if the registry and the constants above drift apart.
    pub fn config(&self) -> Option<&'static LanguageConfig> {
        LanguageRegistry::get().get_by_code(self.code)
    }

    /// The language name in English, falling back to the code.
    pub fn name(&self) -> &'static str {
        self.config().map(|c| c.name).unwrap_or(self.code)
    }

    /// The language name in its own language, falling back to the code.
    pub fn native_name(&self) -> &'static str {
        self.config().map(|c| c.native_name).unwrap_or(self.code)
    }

    pub fn is_default(&self) -> bool {
        self.code == DEFAULT_LANGUAGE
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::default_language()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_constants_match_registry() {
        for lang in [
            Language::DANISH,
            Language::ENGLISH,
            Language::SWEDISH,
            Language::GERMAN,
        ] {
            assert!(lang.config().is_some(), "{} missing from registry", lang);
        }
    }

    #[test]
    fn test_danish_is_default() {
        assert!(Language::DANISH.is_default());
        assert!(!Language::ENGLISH.is_default());
        assert_eq!(Language::default(), Language::DANISH);
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_swedish() {
        let language = Language::from_code("sv").expect("Should succeed");
        assert_eq!(language, Language::SWEDISH);
        assert_eq!(language.name(), "Swedish");
        assert_eq!(language.native_name(), "Svenska");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    // ==================== Enumeration Tests ====================

    #[test]
    fn test_all_in_selector_order() {
        let codes: Vec<_> = Language::all().iter().map(|l| l.code()).collect();
        assert_eq!(codes, vec!["da", "en", "sv", "de"]);
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::GERMAN.to_string(), "de");
    }
}
