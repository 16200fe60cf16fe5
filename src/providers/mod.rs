//! Provider adapters: one uniform wrapper per external AI backend.
//!
//! Every adapter turns a prompt into one outbound HTTP call and maps any
//! transport error, non-success status or unparsable body into a
//! `ProviderFailure`. Adapters never panic and never return an error type the
//! orchestrator has to unwind; `attempt` folds everything into a
//! `TranslationOutcome`.

mod claude;
mod gemini;
mod openai;
pub mod prompt;

pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use openai::ChatCompletionsAdapter;
pub use prompt::Prompt;

use crate::config::Config;
use crate::content::ContentNode;
use crate::i18n::LanguageDescriptor;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Identifier of an external AI provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DeepSeek,
    Claude,
    OpenAi,
    Gemini,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::DeepSeek,
        ProviderId::Claude,
        ProviderId::OpenAi,
        ProviderId::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Claude => "claude",
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown provider: '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Why a provider produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    #[error("{0} API key not configured")]
    NotConfigured(ProviderId),

    /// Network error or timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Malformed or unexpected response body
    #[error("unparsable response: {0}")]
    Parse(String),

    #[error("response contained no text")]
    Empty,
}

impl ProviderFailure {
    pub(crate) fn transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderFailure::Transport(format!("request timed out: {}", error))
        } else {
            ProviderFailure::Transport(error.to_string())
        }
    }

    /// Consume a non-success response into a `Status` failure.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        ProviderFailure::Status { status, body }
    }
}

/// Result of a single adapter attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Success(String),
    Failure(ProviderFailure),
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Success(_))
    }
}

/// Uniform capability implemented once per provider.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Send one prompt and return the raw generated text.
    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderFailure>;

    /// Localize a single leaf string.
    ///
    /// Empty input short-circuits to `Success("")` without a network call.
    async fn attempt(&self, text: &str, target: &LanguageDescriptor) -> TranslationOutcome {
        if text.is_empty() {
            return TranslationOutcome::Success(String::new());
        }

        match self.complete(&prompt::leaf_prompt(text, target)).await {
            Ok(raw) => {
                let cleaned = prompt::clean_text_response(&raw);
                if cleaned.is_empty() {
                    TranslationOutcome::Failure(ProviderFailure::Empty)
                } else {
                    TranslationOutcome::Success(cleaned)
                }
            }
            Err(failure) => TranslationOutcome::Failure(failure),
        }
    }

    /// Localize a whole section in one request, expecting a JSON object back.
    ///
    /// The first well-formed JSON object in the response is parsed. Shape
    /// checking against the input is left to the caller.
    async fn attempt_structured(
        &self,
        section: &str,
        subtree: &ContentNode,
        target: &LanguageDescriptor,
    ) -> Result<ContentNode, ProviderFailure> {
        let raw = self
            .complete(&prompt::section_prompt(section, subtree, target))
            .await?;
        let json = prompt::extract_json_object(&raw)
            .ok_or_else(|| ProviderFailure::Parse("no JSON object in response".to_string()))?;
        serde_json::from_str(json).map_err(|e| ProviderFailure::Parse(e.to_string()))
    }
}

/// Lookup table from provider id to adapter.
#[derive(Clone, Default)]
pub struct ProviderSet {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.adapters.keys().collect();
        ids.sort();
        f.debug_struct("ProviderSet").field("adapters", &ids).finish()
    }
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter, replacing any adapter registered under the same id.
    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn ProviderAdapter>> {
        self.adapters.get(&id)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Build all four HTTP adapters sharing one client with the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::new()
            .with(Arc::new(ChatCompletionsAdapter::deepseek(client.clone(), config)))
            .with(Arc::new(ClaudeAdapter::new(client.clone(), config)))
            .with(Arc::new(ChatCompletionsAdapter::openai(client.clone(), config)))
            .with(Arc::new(GeminiAdapter::new(client, config))))
    }

    /// Providers that have an API key configured.
    pub fn configured(config: &Config) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| config.provider(*id).api_key.is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Adapter that echoes a fixed reply and counts calls to `complete`.
    struct CannedAdapter {
        reply: Result<String, ProviderFailure>,
        calls: AtomicUsize,
    }

    impl CannedAdapter {
        fn new(reply: Result<String, ProviderFailure>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProviderAdapter for CannedAdapter {
        fn id(&self) -> ProviderId {
            ProviderId::OpenAi
        }

        async fn complete(&self, _prompt: &Prompt) -> Result<String, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn spanish() -> &'static LanguageDescriptor {
        LanguageRegistry::get().describe("es").unwrap()
    }

    // ==================== ProviderId Tests ====================

    #[test]
    fn test_provider_id_from_str() {
        assert_eq!("openai".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!(" DeepSeek ".parse::<ProviderId>().unwrap(), ProviderId::DeepSeek);
        assert!("mistral".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_provider_id_display_roundtrip() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
        }
    }

    // ==================== attempt Tests ====================

    #[tokio::test]
    async fn test_attempt_empty_text_makes_no_call() {
        let adapter = CannedAdapter::new(Ok("unused".to_string()));
        let outcome = adapter.attempt("", spanish()).await;

        assert_eq!(outcome, TranslationOutcome::Success(String::new()));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_attempt_trims_reply() {
        let adapter = CannedAdapter::new(Ok("  Hola mundo \n".to_string()));
        let outcome = adapter.attempt("Hello world", spanish()).await;

        assert_eq!(outcome, TranslationOutcome::Success("Hola mundo".to_string()));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_whitespace_reply_is_failure() {
        let adapter = CannedAdapter::new(Ok("   ".to_string()));
        let outcome = adapter.attempt("Hello", spanish()).await;
        assert_eq!(outcome, TranslationOutcome::Failure(ProviderFailure::Empty));
    }

    #[tokio::test]
    async fn test_attempt_passes_failure_through() {
        let failure = ProviderFailure::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        let adapter = CannedAdapter::new(Err(failure.clone()));
        let outcome = adapter.attempt("Hello", spanish()).await;
        assert_eq!(outcome, TranslationOutcome::Failure(failure));
    }

    // ==================== attempt_structured Tests ====================

    #[tokio::test]
    async fn test_attempt_structured_extracts_wrapped_json() {
        let adapter = CannedAdapter::new(Ok(
            "Here is the section:\n```json\n{\"home\": \"Inicio\"}\n```\nEnjoy!".to_string(),
        ));
        let subtree: ContentNode = serde_json::from_str(r#"{"home": "Home"}"#).unwrap();

        let result = adapter
            .attempt_structured("nav", &subtree, spanish())
            .await
            .expect("Should parse");

        assert_eq!(result.lookup(&["home"]), Some(&ContentNode::text("Inicio")));
    }

    #[tokio::test]
    async fn test_attempt_structured_without_json_is_parse_failure() {
        let adapter = CannedAdapter::new(Ok("Sorry, I cannot help with that.".to_string()));
        let subtree: ContentNode = serde_json::from_str(r#"{"home": "Home"}"#).unwrap();

        let result = adapter.attempt_structured("nav", &subtree, spanish()).await;
        assert!(matches!(result, Err(ProviderFailure::Parse(_))));
    }

    // ==================== ProviderSet Tests ====================

    #[test]
    fn test_provider_set_lookup() {
        let set = ProviderSet::new().with(Arc::new(CannedAdapter::new(Ok(String::new()))));

        assert_eq!(set.len(), 1);
        assert!(set.get(ProviderId::OpenAi).is_some());
        assert!(set.get(ProviderId::Claude).is_none());
    }
}
