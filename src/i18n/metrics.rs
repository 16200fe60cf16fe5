//! Localization metrics and observability module.
//!
//! One `LocalizationMetrics` instance is shared (behind an `Arc`) by every
//! component taking part in a run, so counts are isolated per run.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one localization run.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Adapter invocations, across every provider
    provider_attempts: AtomicUsize,

    /// Adapter invocations that returned a failure
    provider_failures: AtomicUsize,

    /// Successes produced by a provider other than the preferred one
    fallbacks_used: AtomicUsize,

    /// Leaves for which every provider failed
    exhausted: AtomicUsize,

    /// Whole-section requests for which every provider failed
    sections_exhausted: AtomicUsize,

    /// String leaves processed by tree walkers
    leaves_processed: AtomicUsize,

    /// Localized leaves that raised validation warnings
    validation_warnings: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.provider_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks_used.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_section_exhausted(&self) {
        self.sections_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_leaf(&self) {
        self.leaves_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_warning(&self) {
        self.validation_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn provider_attempts(&self) -> usize {
        self.provider_attempts.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn fallbacks_used(&self) -> usize {
        self.fallbacks_used.load(Ordering::Relaxed)
    }

    pub fn exhausted(&self) -> usize {
        self.exhausted.load(Ordering::Relaxed)
    }

    pub fn sections_exhausted(&self) -> usize {
        self.sections_exhausted.load(Ordering::Relaxed)
    }

    pub fn leaves_processed(&self) -> usize {
        self.leaves_processed.load(Ordering::Relaxed)
    }

    pub fn validation_warnings(&self) -> usize {
        self.validation_warnings.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let attempts = self.provider_attempts();
        let failures = self.provider_failures();
        let provider_success_rate = if attempts > 0 {
            (attempts.saturating_sub(failures) as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            provider_attempts: attempts,
            provider_failures: failures,
            provider_success_rate,
            fallbacks_used: self.fallbacks_used(),
            exhausted: self.exhausted(),
            sections_exhausted: self.sections_exhausted(),
            leaves_processed: self.leaves_processed(),
            validation_warnings: self.validation_warnings(),
        }
    }
}

/// Snapshot of a run's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub provider_attempts: usize,
    pub provider_failures: usize,

    /// Provider success rate as a percentage (0-100)
    pub provider_success_rate: f64,

    pub fallbacks_used: usize,
    pub exhausted: usize,
    pub sections_exhausted: usize,
    pub leaves_processed: usize,
    pub validation_warnings: usize,
}
