use crate::config::{Config, ProviderSettings};
use crate::providers::{Prompt, ProviderAdapter, ProviderFailure, ProviderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat Completion request (OpenAI-compatible)
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// Adapter for any provider speaking the OpenAI chat-completions protocol.
///
/// Used for both OpenAI and DeepSeek, which differ only in endpoint, model and key.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAdapter {
    id: ProviderId,
    client: reqwest::Client,
    settings: ProviderSettings,
    max_tokens: u32,
}

impl ChatCompletionsAdapter {
    pub fn new(
        id: ProviderId,
        client: reqwest::Client,
        settings: ProviderSettings,
        max_tokens: u32,
    ) -> Self {
        Self {
            id,
            client,
            settings,
            max_tokens,
        }
    }

    pub fn openai(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            ProviderId::OpenAi,
            client,
            config.openai.clone(),
            config.provider_max_tokens,
        )
    }

    pub fn deepseek(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            ProviderId::DeepSeek,
            client,
            config.deepseek.clone(),
            config.provider_max_tokens,
        )
    }

    fn build_request(&self, prompt: &Prompt) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: prompt.user.clone(),
        });

        ChatRequest {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            // Reasoning models don't support temperature
            temperature: if is_reasoning_model(&self.settings.model) {
                None
            } else {
                Some(0.3)
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for ChatCompletionsAdapter {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderFailure> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderFailure::NotConfigured(self.id))?;

        let response = self
            .client
            .post(&self.settings.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(ProviderFailure::transport)?;

        if !response.status().is_success() {
            return Err(ProviderFailure::from_response(response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Parse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ProviderFailure::Empty)
    }
}
