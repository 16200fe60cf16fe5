use crate::config::{Config, ProviderSettings};
use crate::providers::{Prompt, ProviderAdapter, ProviderFailure, ProviderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Adapter for Anthropic's Claude models.
#[derive(Debug, Clone)]
pub struct ClaudeAdapter {
    client: reqwest::Client,
    settings: ProviderSettings,
    max_tokens: u32,
}

impl ClaudeAdapter {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self::with_settings(client, config.claude.clone(), config.provider_max_tokens)
    }

    pub fn with_settings(client: reqwest::Client, settings: ProviderSettings, max_tokens: u32) -> Self {
        Self {
            client,
            settings,
            max_tokens,
        }
    }
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderFailure> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderFailure::NotConfigured(ProviderId::Claude))?;

        let request = MessagesRequest {
            model: self.settings.model.clone(),
            max_tokens: self.max_tokens,
            system: prompt.system.clone(),
            messages: vec![Message {
                role: "user",
                content: prompt.user.clone(),
            }],
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(ProviderFailure::transport)?;

        if !response.status().is_success() {
            return Err(ProviderFailure::from_response(response).await);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Parse(e.to_string()))?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            Err(ProviderFailure::Empty)
        } else {
            Ok(text)
        }
    }
}
