use crate::error::TranslationError;
use crate::fetch::{BundleSource, UnavailableSource};
use crate::i18n::{
    FallbackTable, MetricsReport, ResolverMetrics, TranslationBundle, DEFAULT_LANGUAGE,
};
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info, warn};

type PendingResolution = Shared<BoxFuture<'static, TranslationBundle>>;

/// Per-language bundle cache in front of the fallback chain.
///
/// Resolution order for a code that is not cached:
/// 1. the remote [`BundleSource`]
/// 2. the embedded [`FallbackTable`]
/// 3. the default language, resolved through this same chain
/// 4. the empty bundle
///
/// Steps 1, 2 and 4 cache their result under the requested code. Step 3
/// only populates the default language's slot.
///
/// Concurrent loads of the same uncached code share one resolution. A
/// resolution that completes after [`clear_cache`](Self::clear_cache) still
/// writes its result; the last write for a code wins.
#[derive(Clone)]
pub struct TranslationResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    source: Arc<dyn BundleSource>,
    fallbacks: FallbackTable,
    default_code: String,
    cache: RwLock<HashMap<String, TranslationBundle>>,
    pending: Mutex<HashMap<String, PendingResolution>>,
    metrics: ResolverMetrics,
}

impl TranslationResolver {
    /// Resolver over `source` with the compiled-in fallback bundles.
    pub fn new(source: Arc<dyn BundleSource>) -> Self {
        Self::with_fallbacks(source, FallbackTable::embedded())
    }

    pub fn with_fallbacks(source: Arc<dyn BundleSource>, fallbacks: FallbackTable) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                source,
                fallbacks,
                default_code: DEFAULT_LANGUAGE.to_string(),
                cache: RwLock::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                metrics: ResolverMetrics::default(),
            }),
        }
    }

    /// Resolver that never touches the network.
    pub fn offline() -> Self {
        Self::new(Arc::new(UnavailableSource))
    }

    pub fn default_language(&self) -> &str {
        &self.inner.default_code
    }

    /// Resolve the bundle for `code`. Never fails.
    pub async fn load_language(&self, code: &str) -> TranslationBundle {
        if let Some(bundle) = self.cached(code) {
            debug!("Loading {} translations from cache", code);
            self.inner.metrics.record_cache_hit();
            return bundle;
        }

        let resolution = {
            let mut pending = lock(&self.inner.pending);

            // A resolution may have finished between the cache check and here
            if let Some(bundle) = self.cached(code) {
                self.inner.metrics.record_cache_hit();
                return bundle;
            }
            self.inner.metrics.record_cache_miss();

            match pending.get(code) {
                Some(in_flight) => {
                    debug!("Joining in-flight resolution of {} translations", code);
                    self.inner.metrics.record_joined_in_flight();
                    in_flight.clone()
                }
                None => {
                    let resolution = self.clone().resolve_uncached(code.to_string()).shared();
                    pending.insert(code.to_string(), resolution.clone());
                    resolution
                }
            }
        };

        resolution.await
    }

    /// Resolve every code concurrently and wait until all of them settle.
    ///
    /// Each code runs its own fallback chain, so one code's failures never
    /// hold back or abort another.
    pub async fn preload_languages<I, S>(&self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes: Vec<String> = codes.into_iter().map(|c| c.as_ref().to_string()).collect();
        let loads = codes.iter().map(|code| self.load_language(code));
        join_all(loads).await;
        info!("Preloaded translations for: {:?}", codes);
    }

    /// Drop every cached bundle. Later loads run the full chain again.
    pub fn clear_cache(&self) {
        self.inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        info!("Translation cache cleared");
    }

    /// Codes that currently have a cached bundle.
    pub fn cached_languages(&self) -> BTreeSet<String> {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn is_cached(&self, code: &str) -> bool {
        self.cached(code).is_some()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }

    fn cached(&self, code: &str) -> Option<TranslationBundle> {
        self.inner
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned()
    }

    /// Replace the cache slot for `code` as a whole.
    fn store(&self, code: &str, bundle: TranslationBundle) {
        self.inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code.to_string(), bundle);
    }

    fn resolve_uncached(self, code: String) -> BoxFuture<'static, TranslationBundle> {
        async move {
            let resolved = match self.fetch_or_embedded(&code).await {
                Ok(bundle) => {
                    self.store(&code, bundle.clone());
                    bundle
                }
                Err(e) if code != self.inner.default_code => {
                    debug!("{}", e);
                    info!("Falling back to {} translations", self.inner.default_code);
                    self.inner.metrics.record_default_fallback();
                    self.load_language(&self.inner.default_code).await
                }
                Err(e) => {
                    error!("{}; failed to load any translations, using empty bundle", e);
                    self.inner.metrics.record_empty_fallback();
                    let empty = TranslationBundle::empty();
                    self.store(&code, empty.clone());
                    empty
                }
            };

            lock(&self.inner.pending).remove(&code);
            resolved
        }
        .boxed()
    }

    async fn fetch_or_embedded(&self, code: &str) -> Result<TranslationBundle, TranslationError> {
        self.inner.metrics.record_fetch_attempt();
        match self.inner.source.fetch(code).await {
            Ok(bundle) => {
                info!("Loaded {} translations from remote source", code);
                return Ok(bundle);
            }
            Err(e) => {
                self.inner.metrics.record_fetch_failure();
                warn!("Failed to load {} translations from remote source: {}", code, e);
            }
        }

        let bundle = self
            .inner
            .fallbacks
            .get(code)
            .ok_or_else(|| TranslationError::NoFallback(code.to_string()))?;
        info!("Using embedded fallback translations for {}", code);
        self.inner.metrics.record_embedded_fallback();
        Ok(bundle)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
