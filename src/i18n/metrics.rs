//! Resolution metrics.
//!
//! Counters for cache behaviour and for how often each fallback step was
//! reached. Each resolver owns its own set so that independent resolvers
//! (and tests) never share counts.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ResolverMetrics {
    /// Loads answered from the cache
    cache_hits: AtomicUsize,

    /// Loads that had to run the fallback chain (or join one in flight)
    cache_misses: AtomicUsize,

    /// Loads that attached to a resolution already in flight
    joined_in_flight: AtomicUsize,

    /// Remote fetches issued
    fetch_attempts: AtomicUsize,

    /// Remote fetches that failed or returned a malformed bundle
    fetch_failures: AtomicUsize,

    /// Resolutions answered by the embedded table
    embedded_fallbacks: AtomicUsize,

    /// Resolutions redirected to the default language
    default_fallbacks: AtomicUsize,

    /// Resolutions that ended in the empty bundle
    empty_fallbacks: AtomicUsize,
}

impl ResolverMetrics {
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_joined_in_flight(&self) {
        self.joined_in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_attempt(&self) {
        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_embedded_fallback(&self) {
        self.embedded_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_default_fallback(&self) {
        self.default_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_fallback(&self) {
        self.empty_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn fetch_attempts(&self) -> usize {
        self.fetch_attempts.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let attempts = self.fetch_attempts();
        let failures = self.fetch_failures();
        let fetch_success_rate = if attempts > 0 {
            (attempts.saturating_sub(failures) as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            joined_in_flight: self.joined_in_flight.load(Ordering::Relaxed),
            fetch_attempts: attempts,
            fetch_failures: failures,
            fetch_success_rate,
            embedded_fallbacks: self.embedded_fallbacks.load(Ordering::Relaxed),
            default_fallbacks: self.default_fallbacks.load(Ordering::Relaxed),
            empty_fallbacks: self.empty_fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a resolver's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub joined_in_flight: usize,
    pub fetch_attempts: usize,
    pub fetch_failures: usize,

    /// Fetch success rate as a percentage (0-100)
    pub fetch_success_rate: f64,

    pub embedded_fallbacks: usize,
    pub default_fallbacks: usize,
    pub empty_fallbacks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_cache_hit() {
        let metrics = ResolverMetrics::default();

        assert_eq!(metrics.cache_hits(), 0);
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 2);
    }

    #[test]
    fn test_record_fetch_failure() {
        let metrics = ResolverMetrics::default();

        metrics.record_fetch_attempt();
        metrics.record_fetch_failure();
        assert_eq!(metrics.fetch_attempts(), 1);
        assert_eq!(metrics.fetch_failures(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = ResolverMetrics::default().report();

        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.fetch_success_rate, 0.0);
        assert_eq!(report.empty_fallbacks, 0);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = ResolverMetrics::default();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_fetch_success_rate() {
        let metrics = ResolverMetrics::default();

        // 4 fetches, 1 failure = 75% success rate
        for _ in 0..4 {
            metrics.record_fetch_attempt();
        }
        metrics.record_fetch_failure();

        let report = metrics.report();
        assert_eq!(report.fetch_attempts, 4);
        assert_eq!(report.fetch_success_rate, 75.0);
    }

    #[test]
    fn test_report_fallback_counters() {
        let metrics = ResolverMetrics::default();

        metrics.record_embedded_fallback();
        metrics.record_default_fallback();
        metrics.record_default_fallback();
        metrics.record_empty_fallback();
        metrics.record_joined_in_flight();

        let report = metrics.report();
        assert_eq!(report.embedded_fallbacks, 1);
        assert_eq!(report.default_fallbacks, 2);
        assert_eq!(report.empty_fallbacks, 1);
        assert_eq!(report.joined_in_flight, 1);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = ResolverMetrics::default();
        metrics.record_cache_miss();

        let json = serde_json::to_value(metrics.report()).expect("Should serialize");
        assert_eq!(json["cache_misses"], 1);
        assert!(json.get("fetch_success_rate").is_some());
    }
}
