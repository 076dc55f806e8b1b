//! Internationalization (i18n) building blocks.
//!
//! # Architecture
//!
//! - `registry`: the fixed table of supported languages and the default code
//! - `language`: validated `Language` type over that table
//! - `bundle`: immutable translation bundles and nested key resolution
//! - `embedded`: compiled-in fallback bundles
//! - `metrics`: per-resolver cache and fallback counters
//!
//! # Example
//!
//! ```rust,ignore
//! use translation_sync::i18n::{FallbackTable, Language};
//!
//! let bundle = FallbackTable::embedded().get(Language::default().code());
//! let subtitle = bundle.and_then(|b| b.text("hero.subtitle").map(str::to_owned));
//! ```

mod bundle;
mod embedded;
mod language;
mod metrics;
mod registry;

pub use bundle::{resolve, TranslationBundle, KEY_DELIMITER};
pub use embedded::FallbackTable;
pub use language::Language;
pub use metrics::{MetricsReport, ResolverMetrics};
pub use registry::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE};
