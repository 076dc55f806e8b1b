use crate::i18n::resolve;
use crate::loader::TranslationResolver;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// A view that re-renders itself when the active language changes.
#[async_trait]
pub trait LocalizableConsumer: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// Resolve this consumer's own copy of the bundle for `code` and
    /// re-render.
    async fn update_language(&self, code: &str) -> Result<()>;
}

/// Opaque registration returned by [`ConsumerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerHandle(u64);

/// A registered consumer and the lock that orders its updates.
///
/// Updates of one consumer run one at a time in the order they acquire the
/// lock, so a later switch always renders after an earlier one.
#[derive(Clone)]
pub struct Registration {
    handle: ConsumerHandle,
    consumer: Arc<dyn LocalizableConsumer>,
    updates: Arc<tokio::sync::Mutex<()>>,
}

impl Registration {
    pub fn handle(&self) -> ConsumerHandle {
        self.handle
    }

    pub fn consumer(&self) -> &Arc<dyn LocalizableConsumer> {
        &self.consumer
    }

    /// Wait until no other update of this consumer is running.
    pub async fn lock_updates(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.updates).lock_owned().await
    }
}

/// The set of consumers informed of language switches.
///
/// The registry holds consumers but not their rendering state, and does not
/// check how they behave.
#[derive(Default)]
pub struct ConsumerRegistry {
    next_id: AtomicU64,
    consumers: RwLock<Vec<Registration>>,
}

impl ConsumerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a consumer. It is notified of switches that start after this call.
    pub fn register(&self, consumer: Arc<dyn LocalizableConsumer>) -> ConsumerHandle {
        let handle = ConsumerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!("Registered consumer '{}' as {:?}", consumer.name(), handle);
        self.consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                handle,
                consumer,
                updates: Arc::new(tokio::sync::Mutex::new(())),
            });
        handle
    }

    /// Remove a consumer. Returns `false` if the handle was not registered.
    pub fn deregister(&self, handle: ConsumerHandle) -> bool {
        let mut consumers = self.consumers.write().unwrap_or_else(PoisonError::into_inner);
        let before = consumers.len();
        consumers.retain(|registration| registration.handle != handle);
        consumers.len() != before
    }

    /// The consumers registered right now, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn LocalizableConsumer>> {
        self.registrations()
            .into_iter()
            .map(|registration| registration.consumer)
            .collect()
    }

    /// Like [`snapshot`](Self::snapshot), with each consumer's update lock.
    pub fn registrations(&self) -> Vec<Registration> {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|registration| registration.consumer.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A consumer that renders one section of the bundle, such as
/// `ai_mentor.chatbox`.
///
/// When the section is missing from the resolved bundle the built-in
/// defaults are shown instead.
pub struct SectionView {
    name: String,
    section: String,
    defaults: Value,
    resolver: TranslationResolver,
    rendered: RwLock<Option<RenderedSection>>,
}

#[derive(Debug, Clone, PartialEq)]
struct RenderedSection {
    language: String,
    content: Value,
}

impl SectionView {
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        defaults: Value,
        resolver: TranslationResolver,
    ) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            defaults,
            resolver,
            rendered: RwLock::new(None),
        }
    }

    /// Language of the last render, if rendered at all.
    pub fn language(&self) -> Option<String> {
        self.read().map(|r| r.language)
    }

    /// The rendered section content.
    pub fn content(&self) -> Option<Value> {
        self.read().map(|r| r.content)
    }

    /// A string inside the rendered section, e.g. `title` or `tabs.all`.
    pub fn text(&self, key: &str) -> Option<String> {
        let rendered = self.read()?;
        resolve(&rendered.content, key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn read(&self) -> Option<RenderedSection> {
        self.rendered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LocalizableConsumer for SectionView {
    fn name(&self) -> &str {
        &self.name
    }

    async fn update_language(&self, code: &str) -> Result<()> {
        let bundle = self.resolver.load_language(code).await;

        let content = match bundle.get(&self.section) {
            Some(section) if section.is_object() => section.clone(),
            _ => {
                debug!(
                    "Section '{}' missing for {}, rendering '{}' defaults",
                    self.section, code, self.name
                );
                self.defaults.clone()
            }
        };

        *self.rendered.write().unwrap_or_else(PoisonError::into_inner) = Some(RenderedSection {
            language: code.to_string(),
            content,
        });
        Ok(())
    }
}
