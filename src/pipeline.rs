//! Batch localization run across languages.
//!
//! Languages are processed one at a time; inside a language, sections run
//! concurrently through the chunker. An unknown language is skipped and
//! reported without stopping the run.

use crate::chunker::{ChunkMode, SectionChunker, SectionSet};
use crate::config::Config;
use crate::content::{ContentMap, ContentNode};
use crate::i18n::{LanguageRegistry, MetricsReport};
use crate::orchestrator::Orchestrator;
use crate::store::LocalizedStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A target language that was not produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLanguage {
    pub code: String,
    pub reason: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub completed: Vec<String>,
    pub aliased: Vec<String>,
    pub skipped: Vec<SkippedLanguage>,
    pub metrics: MetricsReport,
}

impl RunReport {
    /// True when the run produced no language document at all.
    pub fn produced_nothing(&self) -> bool {
        self.completed.is_empty() && self.aliased.is_empty()
    }
}

pub struct LocalizationPipeline {
    orchestrator: Arc<Orchestrator>,
    default_language: String,
    aliased: Vec<String>,
    sections: SectionSet,
    pacing: Duration,
    concurrency: usize,
    mode: ChunkMode,
}

impl LocalizationPipeline {
    pub fn new(orchestrator: Arc<Orchestrator>, default_language: impl Into<String>) -> Self {
        Self {
            orchestrator,
            default_language: default_language.into(),
            aliased: Vec::new(),
            sections: SectionSet::default(),
            pacing: Duration::from_millis(200),
            concurrency: 4,
            mode: ChunkMode::Walk,
        }
    }

    pub fn from_config(orchestrator: Arc<Orchestrator>, config: &Config) -> Self {
        Self::new(orchestrator, config.default_language.clone())
            .with_aliases(config.aliased_languages.clone())
            .with_sections(config.sections.clone())
            .with_pacing(config.pacing_delay())
            .with_concurrency(config.section_concurrency)
            .with_mode(config.chunk_mode)
    }

    pub fn with_aliases(mut self, aliased: Vec<String>) -> Self {
        self.aliased = aliased;
        self
    }

    pub fn with_sections(mut self, sections: SectionSet) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_mode(mut self, mode: ChunkMode) -> Self {
        self.mode = mode;
        self
    }

    /// Every registry language except the default.
    pub fn default_targets(&self) -> Vec<String> {
        LanguageRegistry::get()
            .list_all()
            .into_iter()
            .filter(|language| language.code != self.default_language)
            .map(|language| language.code.to_string())
            .collect()
    }

    /// Localize `canonical` into each of `targets`.
    ///
    /// # Returns
    /// The assembled store (default tree, every completed language and every
    /// alias) and a report of what happened to each language.
    pub async fn run(&self, canonical: &ContentMap, targets: &[String]) -> (LocalizedStore, RunReport) {
        let registry = LanguageRegistry::get();
        let chunker = SectionChunker::new(
            self.orchestrator.clone(),
            self.pacing,
            self.concurrency,
            self.mode,
        );

        for (group, codes) in registry.providers_summary() {
            debug!("{}: {}", group, codes.join(", "));
        }

        let uncovered = self.sections.uncovered(canonical);
        if !uncovered.is_empty() {
            warn!(
                "Top-level keys outside every section stay in '{}': {}",
                self.default_language,
                uncovered.join(", ")
            );
        }

        let mut store = LocalizedStore::new(
            self.default_language.clone(),
            ContentNode::Map(canonical.clone()),
        );
        let mut completed = Vec::new();
        let mut aliased = Vec::new();
        let mut skipped = Vec::new();

        for code in &self.aliased {
            if *code != self.default_language && !aliased.contains(code) {
                store.alias_to_default(code.clone());
                aliased.push(code.clone());
            }
        }
        if !aliased.is_empty() {
            info!("Serving {} from the '{}' document", aliased.join(", "), self.default_language);
        }

        for code in targets {
            if *code == self.default_language || aliased.contains(code) || completed.contains(code) {
                continue;
            }

            let language = match registry.describe(code) {
                Ok(language) => language,
                Err(e) => {
                    warn!("Skipping language: {}", e);
                    skipped.push(SkippedLanguage {
                        code: code.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            info!("Localizing {}", language);
            let sections = chunker.chunk(canonical, &self.sections, language).await;

            let mut document = canonical.clone();
            for (name, localized) in sections {
                document.insert(name, localized);
            }
            store.insert(code.clone(), ContentNode::Map(document));
            completed.push(code.clone());
            info!("Finished {} ({}/{})", language, completed.len(), targets.len());
        }

        let report = RunReport {
            completed,
            aliased,
            skipped,
            metrics: self.orchestrator.metrics().report(),
        };
        (store, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::tests::{scripted, uppercase};

    fn canonical() -> ContentMap {
        serde_json::from_str(
            r#"{
                "nav": {"home": "Home", "count": 3},
                "footer": {"copyright": "All rights reserved"},
                "internal": {"build": "abc"}
            }"#,
        )
        .expect("Should parse")
    }

    fn pipeline(orchestrator: Orchestrator) -> LocalizationPipeline {
        LocalizationPipeline::new(Arc::new(orchestrator), "en")
            .with_sections(SectionSet::new(["nav", "footer"]))
            .with_pacing(Duration::ZERO)
            .with_aliases(vec!["da".to_string(), "no".to_string()])
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    // ==================== run Tests ====================

    #[tokio::test]
    async fn test_run_localizes_targets_and_keeps_shape() {
        let (orchestrator, _calls) = uppercase();
        let (store, report) = pipeline(orchestrator)
            .run(&canonical(), &codes(&["fr", "ja"]))
            .await;

        assert_eq!(report.completed, vec!["fr", "ja"]);
        let french = store.get("fr").expect("fr should be stored");
        assert!(french.same_shape(store.default_tree()));
        assert_eq!(
            french.lookup(&["nav", "home"]),
            Some(&ContentNode::text("HOME"))
        );
        // Keys outside the section list keep the source text
        assert_eq!(
            french.lookup(&["internal", "build"]),
            Some(&ContentNode::text("abc"))
        );
    }

    #[tokio::test]
    async fn test_run_aliases_without_provider_calls() {
        let (orchestrator, calls) = uppercase();
        let (store, report) = pipeline(orchestrator)
            .run(&canonical(), &codes(&["da", "no"]))
            .await;

        assert_eq!(report.aliased, vec!["da", "no"]);
        assert!(report.completed.is_empty());
        assert!(store.is_alias("no"));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_skips_unknown_language_and_continues() {
        let (orchestrator, _calls) = uppercase();
        let (store, report) = pipeline(orchestrator)
            .run(&canonical(), &codes(&["xx", "de"]))
            .await;

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].code, "xx");
        assert!(report.skipped[0].reason.contains("Unknown language"));
        assert_eq!(report.completed, vec!["de"]);
        assert!(store.get("xx").is_none());
    }

    #[tokio::test]
    async fn test_run_skips_default_language() {
        let (orchestrator, calls) = uppercase();
        let (_store, report) = pipeline(orchestrator)
            .run(&canonical(), &codes(&["en"]))
            .await;

        assert!(report.completed.is_empty());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_exhaustion_keeps_source_text() {
        let (orchestrator, _journal) = scripted(&[]);
        let (store, report) = pipeline(orchestrator)
            .run(&canonical(), &codes(&["ko"]))
            .await;

        assert_eq!(report.completed, vec!["ko"]);
        assert_eq!(store.get("ko"), Some(store.default_tree()));
        assert_eq!(report.metrics.exhausted, 2);
    }

    #[test]
    fn test_default_targets_exclude_default() {
        let (orchestrator, _calls) = uppercase();
        let targets = pipeline(orchestrator).default_targets();

        assert_eq!(targets.len(), 29);
        assert!(!targets.contains(&"en".to_string()));
    }

    #[test]
    fn test_report_produced_nothing() {
        let report = RunReport {
            completed: Vec::new(),
            aliased: Vec::new(),
            skipped: vec![SkippedLanguage {
                code: "xx".to_string(),
                reason: "unknown".to_string(),
            }],
            metrics: crate::i18n::LocalizationMetrics::new().report(),
        };
        assert!(report.produced_nothing());
    }
}
