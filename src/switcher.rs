use crate::consumer::{ConsumerHandle, ConsumerRegistry, LocalizableConsumer};
use crate::error::TranslationError;
use crate::i18n::{Language, LanguageRegistry, TranslationBundle};
use crate::loader::TranslationResolver;
use crate::preference::PreferenceStore;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How the broadcast step of a switch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastOutcome {
    /// Every consumer in the snapshot updated successfully
    Completed { consumers: usize },

    /// The first consumer failure; other updates keep running in the background
    Failed(TranslationError),

    /// A newer switch started before this one finished. Its bundle was not
    /// applied, or the newer switch took over its consumer updates
    Superseded { by: u64 },
}

/// Result of one `set_language` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchReport {
    pub code: String,
    pub sequence: u64,
    pub outcome: BroadcastOutcome,
}

impl SwitchReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BroadcastOutcome::Completed { .. })
    }
}

/// Diagnostic view of the switcher.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub language: String,
    pub consumers: Vec<String>,
    pub translations_loaded: bool,
    pub cached_languages: BTreeSet<String>,
}

#[derive(Debug)]
struct ViewState {
    /// The language every component should be showing
    active_language: String,

    /// The language highlighted in the selector
    selected_language: String,

    /// Language attribute of the hosting document, set once a bundle applies
    document_language: Option<String>,

    /// Bundle backing the globally owned elements
    translations: TranslationBundle,

    /// Globally owned elements, by translation key
    elements: BTreeMap<String, Option<String>>,
}

/// Coordinates language switches across the whole surface.
///
/// A switch persists the choice, updates the active language and selector
/// right away, resolves the bundle, applies it to globally owned elements and
/// then notifies every registered consumer concurrently.
///
/// Switches are numbered. Global view state only changes under the view lock
/// and only for the newest switch. Each consumer's updates run in switch
/// order, and an update whose switch is no longer the newest is skipped, so
/// once the newest switch settles nothing is left showing an older language.
pub struct SwitchOrchestrator {
    resolver: TranslationResolver,
    registry: Arc<ConsumerRegistry>,
    preferences: Arc<dyn PreferenceStore>,
    view: RwLock<ViewState>,
    latest_switch: Arc<AtomicU64>,
    broadcasts: Mutex<Vec<JoinHandle<()>>>,
}

impl SwitchOrchestrator {
    /// Create the switcher, seeding the active language from `preferences`.
    pub fn new(
        resolver: TranslationResolver,
        registry: Arc<ConsumerRegistry>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let active_language = match preferences.load() {
            Ok(Some(code)) => code,
            Ok(None) => resolver.default_language().to_string(),
            Err(e) => {
                warn!("Failed to read language preference: {:#}", e);
                resolver.default_language().to_string()
            }
        };
        info!("Starting with language: {}", active_language);

        Self {
            resolver,
            registry,
            preferences,
            view: RwLock::new(ViewState {
                selected_language: active_language.clone(),
                active_language,
                document_language: None,
                translations: TranslationBundle::empty(),
                elements: BTreeMap::new(),
            }),
            latest_switch: Arc::new(AtomicU64::new(0)),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    /// Apply the active language, as done once on startup.
    pub async fn initialize(&self) -> SwitchReport {
        let code = self.current_language();
        let report = self.set_language(&code).await;
        info!("Language switcher initialized");
        report
    }

    /// Switch the whole surface to `code`.
    ///
    /// Never fails. Consumer failures are logged and reported in the
    /// returned [`SwitchReport`]; the selector keeps showing `code`
    /// regardless.
    pub async fn set_language(&self, code: &str) -> SwitchReport {
        let sequence = self.latest_switch.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Setting language to: {} (switch #{})", code, sequence);

        {
            let mut view = self.write_view();
            if let Some(latest) = self.newer_switch(sequence) {
                return self.superseded(code, sequence, latest);
            }
            if let Err(e) = self.preferences.save(code) {
                warn!("Failed to persist language preference {}: {:#}", code, e);
            }
            view.active_language = code.to_string();
            view.selected_language = code.to_string();
        }

        let bundle = self.resolver.load_language(code).await;
        debug!("Loaded translations for {}: {:?}", code, bundle.sections());

        if let Err(latest) = self.apply_globally(sequence, code, &bundle) {
            return self.superseded(code, sequence, latest);
        }

        let outcome = match self.broadcast(sequence, code).await {
            Ok(_) if self.newer_switch(sequence).is_some() => {
                let latest = self.latest_switch.load(Ordering::SeqCst);
                info!(
                    "Switch #{} to {} finished after switch #{} started",
                    sequence, code, latest
                );
                BroadcastOutcome::Superseded { by: latest }
            }
            Ok(consumers) => {
                info!("Language successfully switched to: {}", code);
                BroadcastOutcome::Completed { consumers }
            }
            Err(e) => {
                error!("Failed to set language to {}: {}", code, e);
                BroadcastOutcome::Failed(e)
            }
        };

        SwitchReport {
            code: code.to_string(),
            sequence,
            outcome,
        }
    }

    /// Wait for every consumer update spawned so far, including the ones
    /// left running after a failed broadcast.
    pub async fn settle(&self) {
        let handles = {
            let mut broadcasts = self.broadcasts.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *broadcasts)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Consumer update task ended abnormally: {}", e);
            }
        }
    }

    pub fn register(&self, consumer: Arc<dyn LocalizableConsumer>) -> ConsumerHandle {
        self.registry.register(consumer)
    }

    pub fn deregister(&self, handle: ConsumerHandle) -> bool {
        self.registry.deregister(handle)
    }

    pub fn registry(&self) -> &Arc<ConsumerRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &TranslationResolver {
        &self.resolver
    }

    pub fn current_language(&self) -> String {
        self.read_view(|view| view.active_language.clone())
    }

    pub fn selected_language(&self) -> String {
        self.read_view(|view| view.selected_language.clone())
    }

    pub fn document_language(&self) -> Option<String> {
        self.read_view(|view| view.document_language.clone())
    }

    /// The bundle applied by the most recent non-superseded switch.
    pub fn current_translations(&self) -> TranslationBundle {
        self.read_view(|view| view.translations.clone())
    }

    /// Track a globally owned element by its translation key.
    ///
    /// The element is rendered immediately from the current bundle and again
    /// on every switch.
    pub fn bind_element(&self, key: &str) {
        let mut view = self.write_view();
        let text = non_empty_text(&view.translations, key);
        view.elements.insert(key.to_string(), text);
    }

    /// Current text of a bound element. `None` if unbound or never rendered.
    pub fn element_text(&self, key: &str) -> Option<String> {
        self.read_view(|view| view.elements.get(key).cloned().flatten())
    }

    pub fn available_languages(&self) -> Vec<Language> {
        Language::all()
    }

    pub fn is_language_available(&self, code: &str) -> bool {
        LanguageRegistry::get().is_available(code)
    }

    pub async fn preload_all_translations(&self) {
        self.resolver
            .preload_languages(LanguageRegistry::get().codes())
            .await;
        info!("All translations preloaded");
    }

    /// Look up `key` in `lang`, or in the active translations when `lang` is
    /// `None` or already active.
    pub async fn get_translation(&self, key: &str, lang: Option<&str>) -> Option<Value> {
        let current = self.current_language();
        match lang {
            Some(target) if target != current => {
                self.resolver.load_language(target).await.get(key).cloned()
            }
            _ => self.current_translations().get(key).cloned(),
        }
    }

    pub fn state_snapshot(&self) -> StateSnapshot {
        let (language, translations_loaded) = self.read_view(|view| {
            (view.active_language.clone(), !view.translations.is_empty())
        });
        StateSnapshot {
            language,
            consumers: self.registry.names(),
            translations_loaded,
            cached_languages: self.resolver.cached_languages(),
        }
    }

    /// The newest switch number, if it is newer than `sequence`.
    fn newer_switch(&self, sequence: u64) -> Option<u64> {
        let latest = self.latest_switch.load(Ordering::SeqCst);
        (latest != sequence).then_some(latest)
    }

    fn superseded(&self, code: &str, sequence: u64, latest: u64) -> SwitchReport {
        info!(
            "Discarding switch #{} to {}: superseded by switch #{}",
            sequence, code, latest
        );
        SwitchReport {
            code: code.to_string(),
            sequence,
            outcome: BroadcastOutcome::Superseded { by: latest },
        }
    }

    /// Apply `bundle` to the global view state unless a newer switch started.
    ///
    /// Returns the newer switch number when it did.
    fn apply_globally(
        &self,
        sequence: u64,
        code: &str,
        bundle: &TranslationBundle,
    ) -> Result<(), u64> {
        let mut guard = self.write_view();
        if let Some(latest) = self.newer_switch(sequence) {
            return Err(latest);
        }
        let view = &mut *guard;
        view.translations = bundle.clone();
        view.document_language = Some(code.to_string());

        // Elements whose key has no text in this bundle keep their old text
        for (key, text) in view.elements.iter_mut() {
            if let Some(translation) = non_empty_text(bundle, key) {
                *text = Some(translation);
            }
        }
        Ok(())
    }

    /// Notify every currently registered consumer concurrently.
    ///
    /// Returns at the first failure. Updates already started keep running;
    /// their handles are kept for [`settle`](Self::settle). An update that
    /// gets its consumer's lock after a newer switch started is skipped.
    async fn broadcast(&self, sequence: u64, code: &str) -> Result<usize, TranslationError> {
        let registrations = self.registry.registrations();
        let expected = registrations.len();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut spawned = Vec::with_capacity(expected);
        for registration in registrations {
            let tx = tx.clone();
            let code = code.to_string();
            let latest_switch = Arc::clone(&self.latest_switch);
            spawned.push(tokio::spawn(async move {
                let _updating = registration.lock_updates().await;
                let consumer = registration.consumer();
                if latest_switch.load(Ordering::SeqCst) != sequence {
                    debug!(
                        "Skipping stale update of '{}' to {} (switch #{})",
                        consumer.name(),
                        code,
                        sequence
                    );
                    let _ = tx.send(Ok(()));
                    return;
                }

                let outcome = consumer.update_language(&code).await.map_err(|e| {
                    TranslationError::ConsumerUpdate {
                        consumer: consumer.name().to_string(),
                        code: code.clone(),
                        reason: format!("{:#}", e),
                    }
                });
                if let Err(e) = &outcome {
                    warn!("{}", e);
                }
                // The aggregate stops listening after the first failure
                let _ = tx.send(outcome);
            }));
        }
        drop(tx);
        self.track(spawned);

        let mut updated = 0;
        while updated < expected {
            match rx.recv().await {
                Some(Ok(())) => updated += 1,
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(TranslationError::ConsumerUpdate {
                        consumer: "<unknown>".to_string(),
                        code: code.to_string(),
                        reason: "update task ended without reporting".to_string(),
                    })
                }
            }
        }

        debug!("All {} consumers updated to {}", updated, code);
        Ok(updated)
    }

    fn track(&self, spawned: Vec<JoinHandle<()>>) {
        let mut broadcasts = self.broadcasts.lock().unwrap_or_else(PoisonError::into_inner);
        broadcasts.retain(|handle| !handle.is_finished());
        broadcasts.extend(spawned);
    }

    fn read_view<T>(&self, read: impl FnOnce(&ViewState) -> T) -> T {
        read(&self.view.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_view(&self) -> std::sync::RwLockWriteGuard<'_, ViewState> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty_text(bundle: &TranslationBundle, key: &str) -> Option<String> {
    bundle
        .text(key)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
