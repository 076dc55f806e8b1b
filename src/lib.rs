//! Translation bundle resolution and language-switch broadcast.
//!
//! A [`TranslationResolver`] turns a language code into a bundle, trying the
//! remote source first, then the compiled-in bundles, then the default
//! language, then an empty bundle. A [`SwitchOrchestrator`] applies a chosen
//! language to globally owned elements and tells every registered
//! [`LocalizableConsumer`] to re-render.

pub mod config;
pub mod consumer;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod loader;
pub mod preference;
pub mod switcher;

pub use config::Config;
pub use consumer::{ConsumerHandle, ConsumerRegistry, LocalizableConsumer, SectionView};
pub use error::TranslationError;
pub use fetch::{BundleSource, HttpBundleSource, UnavailableSource};
pub use i18n::{Language, TranslationBundle};
pub use loader::TranslationResolver;
pub use preference::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use switcher::{BroadcastOutcome, StateSnapshot, SwitchOrchestrator, SwitchReport};
