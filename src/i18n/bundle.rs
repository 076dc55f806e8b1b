//! Translation bundles and nested key resolution.
//!
//! A bundle is an immutable JSON tree: objects are internal nodes, everything
//! else is a leaf. Lookups use dot-separated paths such as `hero.subtitle`.

use crate::error::TranslationError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Separator between the segments of a nested key path.
pub const KEY_DELIMITER: char = '.';

/// Resolve a dot-separated `path` against `node`.
///
/// Walks the segments left to right and stops at the first segment that is
/// missing or whose parent is not an object. Defined values are always found,
/// including `""`, `0`, `false` and `null`; `None` means the path does not
/// exist.
pub fn resolve<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(KEY_DELIMITER)
        .try_fold(node, |current, segment| current.as_object()?.get(segment))
}

/// Localized content for one language.
///
/// Cloning is cheap; clones share the same tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBundle {
    root: Arc<Value>,
}

impl TranslationBundle {
    /// The terminal fallback: an empty mapping.
    pub fn empty() -> Self {
        Self {
            root: Arc::new(Value::Object(Map::new())),
        }
    }

    /// Wrap a JSON tree. Returns `None` unless the root is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            root: Arc::new(value),
        })
    }

    /// Parse a bundle payload for `code`.
    pub fn parse(code: &str, payload: &str) -> Result<Self, TranslationError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| TranslationError::parse(code, e))?;
        Self::from_value(value)
            .ok_or_else(|| TranslationError::parse(code, "bundle root is not an object"))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.as_object().map_or(true, Map::is_empty)
    }

    /// Top-level section names, in source order.
    pub fn sections(&self) -> Vec<&str> {
        self.root
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Look up a nested key path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve(&self.root, path)
    }

    /// Look up a nested key path whose value is a string.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Whether both bundles share the same underlying tree.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl Default for TranslationBundle {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ==================== resolve Tests ====================

    #[test]
    fn test_resolve_nested_string() {
        let bundle = json!({"hero": {"subtitle": "Digital support"}});
        assert_eq!(
            resolve(&bundle, "hero.subtitle"),
            Some(&json!("Digital support"))
        );
    }

    #[test]
    fn test_resolve_falsy_values_are_found() {
        let bundle = json!({"a": {"b": 0, "c": false, "d": "", "e": null}});

        assert_eq!(resolve(&bundle, "a.b"), Some(&json!(0)));
        assert_eq!(resolve(&bundle, "a.c"), Some(&json!(false)));
        assert_eq!(resolve(&bundle, "a.d"), Some(&json!("")));
        assert_eq!(resolve(&bundle, "a.e"), Some(&Value::Null));
    }

    #[test]
    fn test_resolve_missing_path_short_circuits() {
        let bundle = json!({"a": {"b": 1}});
        assert_eq!(resolve(&bundle, "a.x.y"), None);
    }

    #[test]
    fn test_resolve_through_leaf_is_not_found() {
        let bundle = json!({"a": {"b": "leaf"}});
        assert_eq!(resolve(&bundle, "a.b.c"), None);
    }

    #[test]
    fn test_resolve_does_not_index_arrays() {
        let bundle = json!({"list": ["first", "second"]});
        assert_eq!(resolve(&bundle, "list.0"), None);
        assert_eq!(resolve(&bundle, "list"), Some(&json!(["first", "second"])));
    }

    #[test]
    fn test_resolve_numeric_object_keys() {
        let bundle = json!({"bullets": {"0": "first", "1": "second"}});
        assert_eq!(resolve(&bundle, "bullets.1"), Some(&json!("second")));
    }

    #[test]
    fn test_resolve_returns_subtree() {
        let bundle = json!({"a": {"b": {"c": 1}}});
        assert_eq!(resolve(&bundle, "a.b"), Some(&json!({"c": 1})));
    }

    #[test]
    fn test_resolve_empty_path_and_empty_segments() {
        let bundle = json!({"a": {"b": 1}});
        assert_eq!(resolve(&bundle, ""), None);
        assert_eq!(resolve(&bundle, "a..b"), None);
        assert_eq!(resolve(&bundle, "a."), None);
    }

    #[test]
    fn test_resolve_on_non_object_root() {
        assert_eq!(resolve(&json!("text"), "a"), None);
        assert_eq!(resolve(&Value::Null, "a"), None);
    }

    proptest! {
        #[test]
        fn test_resolve_is_total(path in "[a-z.]{0,24}") {
            let bundle = json!({"a": {"b": {"c": "x"}}, "d": [1, 2]});
            let _ = resolve(&bundle, &path);
        }

        #[test]
        fn test_resolve_finds_every_inserted_leaf(
            segments in proptest::collection::vec("[a-z]{1,6}", 1..5),
            leaf in any::<i64>(),
        ) {
            let mut value = json!(leaf);
            for segment in segments.iter().rev() {
                let mut map = Map::new();
                map.insert(segment.clone(), value);
                value = Value::Object(map);
            }
            let path = segments.join(".");
            prop_assert_eq!(resolve(&value, &path), Some(&json!(leaf)));
        }
    }

    // ==================== TranslationBundle Tests ====================

    #[test]
    fn test_empty_bundle() {
        let bundle = TranslationBundle::empty();
        assert!(bundle.is_empty());
        assert!(bundle.sections().is_empty());
        assert_eq!(bundle.get("hero.subtitle"), None);
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let result = TranslationBundle::parse("en", "[1, 2, 3]");
        assert!(matches!(result, Err(TranslationError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = TranslationBundle::parse("en", "{not json");
        let error = result.expect_err("should fail");
        assert!(error.to_string().contains("'en'"));
    }

    #[test]
    fn test_sections_preserve_source_order() {
        let bundle = TranslationBundle::parse("en", r#"{"zeta": {}, "alpha": {}, "mid": {}}"#)
            .expect("valid bundle");
        assert_eq!(bundle.sections(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_text_only_returns_strings() {
        let bundle = TranslationBundle::from_value(json!({"a": {"s": "x", "n": 1}}))
            .expect("object root");
        assert_eq!(bundle.text("a.s"), Some("x"));
        assert_eq!(bundle.text("a.n"), None);
        assert_eq!(bundle.get("a.n"), Some(&json!(1)));
    }

    #[test]
    fn test_clones_share_tree() {
        let bundle = TranslationBundle::from_value(json!({"a": 1})).expect("object root");
        let clone = bundle.clone();
        assert!(bundle.ptr_eq(&clone));
        assert_eq!(bundle, clone);
    }
}
