//! Fallback orchestration across provider adapters.
//!
//! Provider order is fixed at configuration time: the language's preferred
//! provider, then that provider's designated fallbacks, then one unconditional
//! last resort. Order never adapts to runtime latency or success history.

use crate::content::ContentNode;
use crate::i18n::{LanguageDescriptor, LeafValidator, LocalizationMetrics};
use crate::providers::{ProviderFailure, ProviderId, ProviderSet, TranslationOutcome, UnknownProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-provider fallback lists plus the last-resort provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChains {
    fallbacks: HashMap<ProviderId, Vec<ProviderId>>,
    last_resort: ProviderId,
}

impl Default for FallbackChains {
    /// CJK-tuned DeepSeek and RTL/Slavic-tuned Claude fall back to the
    /// general-purpose OpenAI; OpenAI falls back to Claude. Gemini is the last
    /// resort for everyone and falls back to OpenAI when it is preferred.
    fn default() -> Self {
        Self::new(ProviderId::Gemini)
            .with_fallbacks(ProviderId::DeepSeek, vec![ProviderId::OpenAi])
            .with_fallbacks(ProviderId::Claude, vec![ProviderId::OpenAi])
            .with_fallbacks(ProviderId::OpenAi, vec![ProviderId::Claude])
            .with_fallbacks(ProviderId::Gemini, vec![ProviderId::OpenAi])
    }
}

impl FallbackChains {
    pub fn new(last_resort: ProviderId) -> Self {
        Self {
            fallbacks: HashMap::new(),
            last_resort,
        }
    }

    pub fn with_fallbacks(mut self, preferred: ProviderId, fallbacks: Vec<ProviderId>) -> Self {
        self.fallbacks.insert(preferred, fallbacks);
        self
    }

    pub fn last_resort(&self) -> ProviderId {
        self.last_resort
    }

    /// Parse `preferred=fallback,fallback;preferred=...`.
    ///
    /// Providers not mentioned get no designated fallbacks (only the last resort).
    pub fn parse(value: &str, last_resort: &str) -> Result<Self, UnknownProvider> {
        let mut chains = Self::new(last_resort.parse()?);

        for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (preferred, rest) = entry.split_once('=').unwrap_or((entry, ""));
            let fallbacks = rest
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<ProviderId>, _>>()?;
            chains.fallbacks.insert(preferred.parse()?, fallbacks);
        }

        Ok(chains)
    }

    /// The full ordered chain for a preferred provider, without duplicates.
    pub fn chain_for(&self, preferred: ProviderId) -> Vec<ProviderId> {
        let mut chain = vec![preferred];
        let designated = self.fallbacks.get(&preferred).into_iter().flatten();
        for id in designated.copied().chain(std::iter::once(self.last_resort)) {
            if !chain.contains(&id) {
                chain.push(id);
            }
        }
        chain
    }
}

/// Tries adapters in chain order and never fails.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    providers: ProviderSet,
    chains: FallbackChains,
    metrics: Arc<LocalizationMetrics>,
}

impl Orchestrator {
    pub fn new(
        providers: ProviderSet,
        chains: FallbackChains,
        metrics: Arc<LocalizationMetrics>,
    ) -> Self {
        Self {
            providers,
            chains,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<LocalizationMetrics> {
        &self.metrics
    }

    pub fn chain_for(&self, target: &LanguageDescriptor) -> Vec<ProviderId> {
        self.chains.chain_for(target.preferred_provider)
    }

    /// Localize one string, returning the source text if every provider fails.
    pub async fn localize(&self, text: &str, target: &LanguageDescriptor) -> String {
        if text.is_empty() {
            return String::new();
        }

        for (position, id) in self.chain_for(target).into_iter().enumerate() {
            let Some(adapter) = self.providers.get(id) else {
                debug!("{}: provider {} not registered, skipping", target.code, id);
                continue;
            };

            self.metrics.record_attempt();
            match adapter.attempt(text, target).await {
                TranslationOutcome::Success(localized) => {
                    if position > 0 {
                        self.metrics.record_fallback();
                        debug!("{}: localized by fallback provider {}", target.code, id);
                    }
                    self.check(text, &localized, target);
                    return localized;
                }
                TranslationOutcome::Failure(failure) => {
                    self.metrics.record_failure();
                    debug!("{}: provider {} failed: {}", target.code, id, failure);
                }
            }
        }

        self.metrics.record_exhausted();
        warn!(
            "All providers failed for {} ({}), keeping source text",
            target.name, target.code
        );
        text.to_string()
    }

    /// Localize a whole section through the chain in one request per provider.
    ///
    /// Only a result with exactly the input's shape is accepted. Returns `None`
    /// when no provider produced one.
    pub async fn localize_section(
        &self,
        section: &str,
        subtree: &ContentNode,
        target: &LanguageDescriptor,
    ) -> Option<ContentNode> {
        for (position, id) in self.chain_for(target).into_iter().enumerate() {
            let Some(adapter) = self.providers.get(id) else {
                continue;
            };

            self.metrics.record_attempt();
            let result = adapter
                .attempt_structured(section, subtree, target)
                .await
                .and_then(|node| {
                    if node.same_shape(subtree) {
                        Ok(node)
                    } else {
                        Err(ProviderFailure::Parse(
                            "response does not match section shape".to_string(),
                        ))
                    }
                });

            match result {
                Ok(node) => {
                    if position > 0 {
                        self.metrics.record_fallback();
                    }
                    return Some(node);
                }
                Err(failure) => {
                    self.metrics.record_failure();
                    debug!(
                        "{}: provider {} failed on section '{}': {}",
                        target.code, id, section, failure
                    );
                }
            }
        }

        self.metrics.record_section_exhausted();
        warn!(
            "All providers failed for section '{}' in {} ({})",
            section, target.name, target.code
        );
        None
    }

    fn check(&self, source: &str, localized: &str, target: &LanguageDescriptor) {
        let validation = LeafValidator::validate(source, localized);
        if validation.is_clean() {
            return;
        }
        self.metrics.record_validation_warning();
        if validation.has_warnings() {
            warn!(
                "Validation warnings for {} ({}): {:?}",
                target.name, target.code, validation.warnings
            );
        }
        if validation.has_errors() {
            warn!(
                "Validation errors for {} ({}): {:?}",
                target.name, target.code, validation.errors
            );
        }
    }
}
