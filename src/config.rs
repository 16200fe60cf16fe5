use crate::chunker::{ChunkMode, SectionSet};
use crate::orchestrator::FallbackChains;
use crate::providers::{ProviderId, ProviderSet};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Credentials and endpoint for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// `None` means the provider is not configured; its adapter fails fast
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl ProviderSettings {
    fn from_env(key_var: &str, url_var: &str, default_url: &str, model_var: &str, default_model: &str) -> Self {
        Self {
            api_key: std::env::var(key_var).ok().filter(|v| !v.trim().is_empty()),
            api_url: std::env::var(url_var).unwrap_or_else(|_| default_url.to_string()),
            model: std::env::var(model_var).unwrap_or_else(|_| default_model.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Providers
    pub openai: ProviderSettings,
    pub claude: ProviderSettings,
    pub deepseek: ProviderSettings,
    pub gemini: ProviderSettings,
    pub provider_timeout_secs: u64,
    pub provider_max_tokens: u32,

    // Routing
    pub fallback_chains: FallbackChains,

    // Pacing and concurrency
    pub pacing_delay_ms: u64,
    pub section_concurrency: usize,

    // Chunking
    pub sections: SectionSet,
    pub chunk_mode: ChunkMode,

    // Languages
    pub default_language: String,
    pub aliased_languages: Vec<String>,
    pub target_languages: Option<Vec<String>>,

    // Storage
    pub canonical_content: PathBuf,
    pub store_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let fallback_chains = std::env::var("FALLBACK_CHAINS")
            .unwrap_or_else(|_| "deepseek=openai;claude=openai;openai=claude;gemini=openai".to_string());
        let last_resort =
            std::env::var("LAST_RESORT_PROVIDER").unwrap_or_else(|_| "gemini".to_string());

        Ok(Self {
            // Providers
            openai: ProviderSettings::from_env(
                "OPENAI_API_KEY",
                "OPENAI_API_URL",
                "https://api.openai.com/v1/chat/completions",
                "OPENAI_MODEL",
                "gpt-4o-mini",
            ),
            claude: ProviderSettings::from_env(
                "ANTHROPIC_API_KEY",
                "ANTHROPIC_API_URL",
                "https://api.anthropic.com/v1/messages",
                "CLAUDE_MODEL",
                "claude-3-5-haiku-20241022",
            ),
            deepseek: ProviderSettings::from_env(
                "DEEPSEEK_API_KEY",
                "DEEPSEEK_API_URL",
                "https://api.deepseek.com/chat/completions",
                "DEEPSEEK_MODEL",
                "deepseek-chat",
            ),
            gemini: ProviderSettings::from_env(
                "GEMINI_API_KEY",
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
                "GEMINI_MODEL",
                "gemini-1.5-flash",
            ),
            provider_timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            provider_max_tokens: std::env::var("PROVIDER_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2048),

            // Routing
            fallback_chains: FallbackChains::parse(&fallback_chains, &last_resort)
                .context("Invalid FALLBACK_CHAINS or LAST_RESORT_PROVIDER")?,

            // Pacing and concurrency
            pacing_delay_ms: std::env::var("PACING_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            section_concurrency: std::env::var("SECTION_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(4),

            // Chunking
            sections: std::env::var("SECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            chunk_mode: match std::env::var("CHUNK_MODE") {
                Ok(mode) => mode.parse().context("Invalid CHUNK_MODE")?,
                Err(_) => ChunkMode::Walk,
            },

            // Languages
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            aliased_languages: std::env::var("ALIASED_LANGUAGES")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| vec!["da".to_string(), "no".to_string()]),
            target_languages: std::env::var("TARGET_LANGUAGES")
                .ok()
                .map(|v| split_list(&v))
                .filter(|list| !list.is_empty()),

            // Storage
            canonical_content: std::env::var("CANONICAL_CONTENT")
                .unwrap_or_else(|_| "content/en.json".to_string())
                .into(),
            store_dir: std::env::var("STORE_DIR")
                .unwrap_or_else(|_| "content/i18n".to_string())
                .into(),
        })
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn provider(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::Claude => &self.claude,
            ProviderId::DeepSeek => &self.deepseek,
            ProviderId::Gemini => &self.gemini,
        }
    }

    /// Providers with an API key. Errors when there are none.
    pub fn require_providers(&self) -> Result<Vec<ProviderId>> {
        let configured = ProviderSet::configured(self);
        if configured.is_empty() {
            bail!(
                "No provider API key found. Set at least one of OPENAI_API_KEY, \
                 ANTHROPIC_API_KEY, DEEPSEEK_API_KEY or GEMINI_API_KEY"
            );
        }
        Ok(configured)
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
