//! Section chunking with a bounded worker pool.
//!
//! A content tree is split into named top-level sections. Each section is
//! localized independently by its own walker, so a section that degrades to
//! source text never affects its neighbours. Sections run concurrently up to
//! the configured limit; leaves inside a section stay sequential.

use crate::content::{ContentMap, ContentNode};
use crate::i18n::LanguageDescriptor;
use crate::orchestrator::Orchestrator;
use crate::pacing::Pacer;
use crate::walker::TreeWalker;
use futures::stream::{self, StreamExt};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_SECTIONS: &[&str] = &[
    "nav",
    "breadcrumbs",
    "common",
    "home",
    "attractions",
    "hotels",
    "dining",
    "destinations",
    "districts",
    "realEstate",
    "search",
    "footer",
    "errors",
    "newsletter",
    "cookies",
    "meta",
    "guides",
    "news",
    "pages",
];

/// Ordered list of top-level section names to localize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSet {
    names: Vec<String>,
}

impl Default for SectionSet {
    fn default() -> Self {
        Self::new(DEFAULT_SECTIONS.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Section list is empty")]
pub struct EmptySectionList;

impl FromStr for SectionSet {
    type Err = EmptySectionList;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let set = Self::new(s.split(',').map(str::trim).filter(|name| !name.is_empty()));
        if set.names.is_empty() {
            Err(EmptySectionList)
        } else {
            Ok(set)
        }
    }
}

impl SectionSet {
    /// Build a set, dropping duplicate names while keeping first occurrence order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self { names: unique }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Section names that exist as top-level keys of `tree`, in set order.
    pub fn present_in<'a>(&'a self, tree: &ContentMap) -> Vec<&'a str> {
        self.names
            .iter()
            .filter(|name| tree.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Top-level keys of `tree` that no section covers.
    pub fn uncovered<'t>(&self, tree: &'t ContentMap) -> Vec<&'t str> {
        tree.keys()
            .filter(|key| !self.names.contains(key))
            .map(String::as_str)
            .collect()
    }
}

/// How a section is sent to providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkMode {
    /// One provider call per string leaf
    #[default]
    Walk,

    /// One provider call per section, falling back to `Walk` on a bad response
    Enhance,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown chunk mode: '{0}' (expected 'walk' or 'enhance')")]
pub struct UnknownChunkMode(pub String);

impl FromStr for ChunkMode {
    type Err = UnknownChunkMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" => Ok(ChunkMode::Walk),
            "enhance" => Ok(ChunkMode::Enhance),
            _ => Err(UnknownChunkMode(s.to_string())),
        }
    }
}

pub struct SectionChunker {
    orchestrator: Arc<Orchestrator>,
    pacing: Duration,
    concurrency: usize,
    mode: ChunkMode,
}

impl SectionChunker {
    /// # Arguments
    /// * `pacing` - Minimum gap between provider calls inside one section
    /// * `concurrency` - Maximum sections in flight; zero is treated as one
    pub fn new(orchestrator: Arc<Orchestrator>, pacing: Duration, concurrency: usize, mode: ChunkMode) -> Self {
        Self {
            orchestrator,
            pacing,
            concurrency: concurrency.max(1),
            mode,
        }
    }

    /// Localize every section of `tree` named in `sections`.
    ///
    /// # Returns
    /// A mapping containing exactly the sections present in both `sections`
    /// and `tree`, in `sections` order. Sections absent from the tree are skipped.
    pub async fn chunk(
        &self,
        tree: &ContentMap,
        sections: &SectionSet,
        target: &LanguageDescriptor,
    ) -> ContentMap {
        let present = sections.present_in(tree);
        info!(
            "Localizing {} sections into {} ({}), {} at a time",
            present.len(),
            target.name,
            target.code,
            self.concurrency
        );

        let jobs = present.into_iter().filter_map(|name| {
            tree.get(name)
                .map(|subtree| self.localize_section(name, subtree, target))
        });

        stream::iter(jobs)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    async fn localize_section(
        &self,
        name: &str,
        subtree: &ContentNode,
        target: &LanguageDescriptor,
    ) -> (String, ContentNode) {
        if self.mode == ChunkMode::Enhance {
            if let Some(localized) = self
                .orchestrator
                .localize_section(name, subtree, target)
                .await
            {
                debug!("{}: section '{}' localized in one request", target.code, name);
                return (name.to_string(), localized);
            }
            debug!(
                "{}: section '{}' falling back to leaf-level localization",
                target.code, name
            );
        }

        let mut walker = TreeWalker::new(&self.orchestrator, target, Pacer::new(self.pacing));
        let localized = walker.walk_from(name.to_string(), subtree).await;
        debug!("{}: section '{}' done", target.code, name);
        (name.to_string(), localized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocalizationMetrics;
    use crate::orchestrator::tests::{describe, scripted, uppercase};
    use crate::orchestrator::FallbackChains;
    use crate::providers::{Prompt, ProviderAdapter, ProviderFailure, ProviderId, ProviderSet, TranslationOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tree(json: &str) -> ContentMap {
        serde_json::from_str(json).expect("Should parse")
    }

    fn chunker(orchestrator: Orchestrator, mode: ChunkMode) -> SectionChunker {
        SectionChunker::new(Arc::new(orchestrator), Duration::ZERO, 2, mode)
    }

    /// Adapter that holds every call open for a while and records how many
    /// calls were in flight at once. Text equal to `broken` always fails.
    struct SlowAdapter {
        id: ProviderId,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProviderAdapter for SlowAdapter {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn complete(&self, _prompt: &Prompt) -> Result<String, ProviderFailure> {
            Err(ProviderFailure::Transport("slow adapter".to_string()))
        }

        async fn attempt(&self, text: &str, _target: &LanguageDescriptor) -> TranslationOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text == "broken" {
                TranslationOutcome::Failure(ProviderFailure::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                TranslationOutcome::Success(text.to_uppercase())
            }
        }
    }

    /// Orchestrator backed by `SlowAdapter`s; returns the shared peak counter.
    fn slow() -> (Orchestrator, Arc<AtomicUsize>) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut set = ProviderSet::new();
        for id in ProviderId::ALL {
            set = set.with(Arc::new(SlowAdapter {
                id,
                in_flight: in_flight.clone(),
                peak: peak.clone(),
            }));
        }
        let orchestrator = Orchestrator::new(
            set,
            FallbackChains::default(),
            Arc::new(LocalizationMetrics::new()),
        );
        (orchestrator, peak)
    }

    // ==================== SectionSet Tests ====================

    #[test]
    fn test_default_sections() {
        let set = SectionSet::default();
        assert_eq!(set.names().len(), 19);
        assert_eq!(set.names()[0], "nav");
        assert!(set.names().iter().any(|n| n == "realEstate"));
    }

    #[test]
    fn test_section_set_from_str() {
        let set: SectionSet = " nav, footer ,,nav".parse().unwrap();
        assert_eq!(set.names(), ["nav", "footer"]);
        assert!(" , ".parse::<SectionSet>().is_err());
    }

    #[test]
    fn test_present_in_and_uncovered() {
        let set = SectionSet::new(["c", "a", "x"]);
        let content = tree(r#"{"a": "1", "b": "2", "c": "3"}"#);

        assert_eq!(set.present_in(&content), vec!["c", "a"]);
        assert_eq!(set.uncovered(&content), vec!["b"]);
    }

    #[test]
    fn test_chunk_mode_from_str() {
        assert_eq!("walk".parse::<ChunkMode>().unwrap(), ChunkMode::Walk);
        assert_eq!(" Enhance".parse::<ChunkMode>().unwrap(), ChunkMode::Enhance);
        assert!("batch".parse::<ChunkMode>().is_err());
    }

    // ==================== chunk Tests ====================

    #[tokio::test]
    async fn test_chunk_only_requested_sections() {
        let (orchestrator, calls) = uppercase();
        let chunker = chunker(orchestrator, ChunkMode::Walk);
        let content = tree(r#"{"a": {"t": "x"}, "b": {"t": "y"}, "c": {"t": "z"}}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["a", "c"]), describe("fr"))
            .await;

        assert_eq!(result, tree(r#"{"a": {"t": "X"}, "c": {"t": "Z"}}"#));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chunk_skips_absent_sections() {
        let (orchestrator, _calls) = uppercase();
        let chunker = chunker(orchestrator, ChunkMode::Walk);
        let content = tree(r#"{"a": "x"}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["missing", "a"]), describe("fr"))
            .await;

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_chunk_failed_section_degrades_to_source() {
        let (orchestrator, _journal) = scripted(&[]);
        let chunker = chunker(orchestrator, ChunkMode::Walk);
        let content = tree(r#"{"a": {"t": "x"}, "b": [1, "y"]}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["a", "b"]), describe("ko"))
            .await;

        assert_eq!(result, content);
    }

    #[tokio::test]
    async fn test_chunk_many_sections_with_small_pool() {
        let (orchestrator, calls) = uppercase();
        let chunker = SectionChunker::new(Arc::new(orchestrator), Duration::ZERO, 1, ChunkMode::Walk);
        let content = tree(r#"{"s1": "a", "s2": "b", "s3": "c", "s4": "d"}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["s4", "s1", "s3", "s2"]), describe("es"))
            .await;

        assert_eq!(result, tree(r#"{"s4": "D", "s1": "A", "s3": "C", "s2": "B"}"#));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_chunk_enhance_uses_whole_section_result() {
        let (orchestrator, calls) = uppercase();
        let chunker = chunker(orchestrator, ChunkMode::Enhance);
        let content = tree(r#"{"nav": {"home": "Home", "count": 3}}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["nav"]), describe("fr"))
            .await;

        assert_eq!(result, tree(r#"{"nav": {"home": "HOME", "count": 3}}"#));
        // Whole-section path makes no leaf-level calls
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chunk_enhance_degrades_to_walk() {
        let (orchestrator, journal) = scripted(&[]);
        let chunker = chunker(orchestrator, ChunkMode::Enhance);
        let content = tree(r#"{"nav": {"home": "Home"}}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["nav"]), describe("de"))
            .await;

        assert_eq!(result, content);
        // Three structured attempts, then three leaf attempts
        assert_eq!(journal.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_chunk_enhance_counts_section_and_leaf_exhaustion_apart() {
        let (orchestrator, _journal) = scripted(&[]);
        let orchestrator = Arc::new(orchestrator);
        let chunker = SectionChunker::new(orchestrator.clone(), Duration::ZERO, 2, ChunkMode::Enhance);
        let content = tree(r#"{"nav": {"home": "Home", "about": "About"}}"#);

        chunker
            .chunk(&content, &SectionSet::new(["nav"]), describe("de"))
            .await;

        assert_eq!(orchestrator.metrics().sections_exhausted(), 1);
        assert_eq!(orchestrator.metrics().exhausted(), 2);
    }

    // ==================== Worker Pool Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_chunk_runs_sections_concurrently_within_limit() {
        let (orchestrator, peak) = slow();
        let chunker = SectionChunker::new(Arc::new(orchestrator), Duration::ZERO, 2, ChunkMode::Walk);
        let content = tree(r#"{"s1": "a", "s2": "b", "s3": "c", "s4": "d", "s5": "e"}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["s1", "s2", "s3", "s4", "s5"]), describe("fr"))
            .await;

        assert_eq!(
            result,
            tree(r#"{"s1": "A", "s2": "B", "s3": "C", "s4": "D", "s5": "E"}"#)
        );
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak > 1, "sections ran one at a time");
        assert!(peak <= 2, "{} sections in flight with a pool of 2", peak);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_pool_of_one_is_sequential() {
        let (orchestrator, peak) = slow();
        let chunker = SectionChunker::new(Arc::new(orchestrator), Duration::ZERO, 1, ChunkMode::Walk);
        let content = tree(r#"{"s1": "a", "s2": "b", "s3": "c"}"#);

        chunker
            .chunk(&content, &SectionSet::new(["s1", "s2", "s3"]), describe("fr"))
            .await;

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_failed_section_does_not_affect_sibling() {
        let (orchestrator, _peak) = slow();
        let orchestrator = Arc::new(orchestrator);
        let chunker = SectionChunker::new(orchestrator.clone(), Duration::ZERO, 2, ChunkMode::Walk);
        let content = tree(r#"{"good": {"t": "hello"}, "bad": {"t": "broken", "n": 1}}"#);

        let result = chunker
            .chunk(&content, &SectionSet::new(["good", "bad"]), describe("es"))
            .await;

        assert_eq!(
            result,
            tree(r#"{"good": {"t": "HELLO"}, "bad": {"t": "broken", "n": 1}}"#)
        );
        assert_eq!(orchestrator.metrics().exhausted(), 1);
    }
}
