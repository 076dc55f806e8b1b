//! Compiled-in fallback bundles.
//!
//! These are used when the remote translation files cannot be fetched. The
//! default language must always be present here so that resolution never
//! depends on the network.

use crate::i18n::TranslationBundle;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::error;

const EMBEDDED_SOURCES: &[(&str, &str)] = &[
    ("da", include_str!("../../translations/da.json")),
    ("en", include_str!("../../translations/en.json")),
    ("sv", include_str!("../../translations/sv.json")),
    ("de", include_str!("../../translations/de.json")),
];

static EMBEDDED: OnceLock<FallbackTable> = OnceLock::new();

/// Mapping from language code to a complete fallback bundle.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    bundles: HashMap<String, TranslationBundle>,
}

impl FallbackTable {
    /// The table compiled into the binary.
    pub fn embedded() -> FallbackTable {
        EMBEDDED.get_or_init(parse_embedded).clone()
    }

    /// A table with no bundles at all.
    pub fn empty() -> FallbackTable {
        FallbackTable::default()
    }

    /// Add or replace the bundle for `code`.
    pub fn with_bundle(mut self, code: &str, bundle: TranslationBundle) -> Self {
        self.bundles.insert(code.to_string(), bundle);
        self
    }

    pub fn get(&self, code: &str) -> Option<TranslationBundle> {
        self.bundles.get(code).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.bundles.contains_key(code)
    }

    /// Codes with a bundle, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

fn parse_embedded() -> FallbackTable {
    let mut table = FallbackTable::empty();
    for (code, source) in EMBEDDED_SOURCES {
        match TranslationBundle::parse(code, source) {
            Ok(bundle) => table = table.with_bundle(code, bundle),
            Err(e) => error!("Embedded fallback bundle is unusable: {}", e),
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{LanguageRegistry, DEFAULT_LANGUAGE};
    use serde_json::json;

    #[test]
    fn test_default_language_is_embedded() {
        assert!(FallbackTable::embedded().contains(DEFAULT_LANGUAGE));
    }

    #[test]
    fn test_every_supported_language_is_embedded() {
        let table = FallbackTable::embedded();
        for code in LanguageRegistry::get().codes() {
            let bundle = table.get(code).expect("embedded bundle should parse");
            assert!(!bundle.is_empty(), "{} bundle is empty", code);
        }
        assert_eq!(table.codes(), vec!["da", "de", "en", "sv"]);
    }

    #[test]
    fn test_embedded_bundles_share_key_layout() {
        let table = FallbackTable::embedded();
        let reference = table.get(DEFAULT_LANGUAGE).expect("default bundle");
        for code in ["en", "sv", "de"] {
            let bundle = table.get(code).expect("bundle");
            assert_eq!(bundle.sections(), reference.sections(), "{}", code);
            assert!(bundle.text("hero.subtitle").is_some());
            assert!(bundle.get("ai_mentor.chatbox").is_some());
        }
    }

    #[test]
    fn test_embedded_conversations_keep_source_order() {
        let bundle = FallbackTable::embedded().get("en").expect("bundle");
        let conversations = bundle
            .get("ai_mentor.scheduling.conversations")
            .and_then(|v| v.as_array())
            .expect("conversation list");
        assert_eq!(conversations[0]["description"], json!("Introductory conversation"));
        assert_eq!(conversations[1]["description"], json!("Midterm evaluation"));
    }

    #[test]
    fn test_unknown_code_has_no_fallback() {
        assert!(FallbackTable::embedded().get("xx").is_none());
    }

    #[test]
    fn test_with_bundle_replaces() {
        let first = TranslationBundle::from_value(json!({"v": 1})).expect("object");
        let second = TranslationBundle::from_value(json!({"v": 2})).expect("object");
        let table = FallbackTable::empty()
            .with_bundle("en", first)
            .with_bundle("en", second.clone());

        assert_eq!(table.get("en"), Some(second));
        assert_eq!(table.codes(), vec!["en"]);
    }
}
